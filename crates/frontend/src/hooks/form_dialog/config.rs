use crate::shared::api::{field_of, AsyncCallback, ValueApi};
use crate::shared::message::MessageApi;
use contracts::shared::crud::DialogMode;
use contracts::shared::error::CrudError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Преобразование перед отправкой; `None` (или `null`) - отправка отменяется
pub type BeforeSubmit = Rc<dyn Fn(Value) -> Option<Value>>;

/// Преобразование данных, полученных для редактирования
pub type AfterGet = Rc<dyn Fn(Value) -> Value>;

pub type SubmitSuccessFuture = Pin<Box<dyn Future<Output = Result<(), CrudError>>>>;

/// `(ответ API, режим, отправленные данные формы)`
pub type SubmitSuccess<T> = Rc<dyn Fn(Value, DialogMode, T) -> SubmitSuccessFuture>;

#[derive(Clone, Default)]
pub struct DataTransformConfig {
    pub before_submit: Option<BeforeSubmit>,
    pub after_get: Option<AfterGet>,
}

pub type RuleCheck<T> = Rc<dyn Fn(&T) -> Result<(), String>>;

/// Проверка одного поля формы
pub struct FieldRule<T> {
    pub field: String,
    check: RuleCheck<T>,
}

impl<T> Clone for FieldRule<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            check: self.check.clone(),
        }
    }
}

/// Правила проверки формы. Для каждого поля сохраняется первое сообщение об ошибке.
pub struct FormRules<T> {
    rules: Vec<FieldRule<T>>,
}

impl<T> Default for FormRules<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Clone for FormRules<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T: Serialize> FormRules<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, check: impl Fn(&T) -> Result<(), String> + 'static) -> Self {
        self.rules.push(FieldRule {
            field: field.into(),
            check: Rc::new(check),
        });
        self
    }

    /// Поле не может быть `null`, пустой строкой или пустым массивом
    pub fn required(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let key = field.clone();
        let message = message.into();
        self.rule(field, move |form| match field_of(form, &key) {
            Value::Null => Err(message.clone()),
            Value::String(s) if s.trim().is_empty() => Err(message.clone()),
            Value::Array(items) if items.is_empty() => Err(message.clone()),
            _ => Ok(()),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self, form: &T) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for rule in &self.rules {
            if errors.contains_key(&rule.field) {
                continue;
            }
            if let Err(message) = (rule.check)(form) {
                errors.insert(rule.field.clone(), message);
            }
        }
        errors
    }
}

/// Настройки диалога формы
pub struct FormDialogConfig<T> {
    /// Шаблон данных формы; копируется при открытии и сбросе
    pub initial_form_data: T,
    pub add_api: ValueApi,
    pub update_api: ValueApi,
    /// Загрузка записи по id при открытии на редактирование
    pub get_api: Option<ValueApi>,
    pub form_rules: FormRules<T>,
    /// Общий колбэк после успешной отправки (обычно - перезагрузка списка)
    pub on_success: Option<AsyncCallback>,
    pub on_submit_success: Option<SubmitSuccess<T>>,
    pub data_transform: DataTransformConfig,
    pub message_api: MessageApi,
    /// Сообщение об успехе, если ответ не содержит `msg`
    pub success_message: String,
}

impl<T> FormDialogConfig<T> {
    pub fn new(initial_form_data: T, add_api: ValueApi, update_api: ValueApi) -> Self {
        Self {
            initial_form_data,
            add_api,
            update_api,
            get_api: None,
            form_rules: FormRules::default(),
            on_success: None,
            on_submit_success: None,
            data_transform: DataTransformConfig::default(),
            message_api: MessageApi::default(),
            success_message: "Операция выполнена успешно".to_string(),
        }
    }
}
