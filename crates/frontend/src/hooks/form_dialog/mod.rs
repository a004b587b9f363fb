//! Хук диалога формы: добавление и редактирование записи.
//!
//! Данные формы копируются из шаблона при каждом открытии и сбросе, так что правки
//! в диалоге не затрагивают ни шаблон, ни строки таблицы.

mod config;

pub use config::{
    AfterGet, BeforeSubmit, DataTransformConfig, FieldRule, FormDialogConfig, FormRules, RuleCheck, SubmitSuccess,
    SubmitSuccessFuture,
};

use super::LoadingGuard;
use crate::shared::api::CrudRecord;
use crate::shared::message::Messenger;
use contracts::shared::crud::{response_data, response_message, DialogMode};
use leptos::logging::{error, log};
use leptos::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

struct FormDialogInner<T> {
    config: FormDialogConfig<T>,
    messenger: Messenger,
}

/// Состояние и операции диалога формы
#[derive(Clone)]
pub struct FormDialog<T: CrudRecord> {
    pub dialog_visible: RwSignal<bool>,
    pub dialog_mode: RwSignal<DialogMode>,
    pub form_data: RwSignal<T>,
    pub submit_loading: RwSignal<bool>,
    /// Загрузка записи для редактирования
    pub form_loading: RwSignal<bool>,
    /// Поле -> сообщение последней проверки
    pub validation_errors: RwSignal<HashMap<String, String>>,
    inner: Rc<FormDialogInner<T>>,
}

impl<T: CrudRecord> FormDialog<T> {
    pub fn new(config: FormDialogConfig<T>) -> Self {
        let messenger = Messenger::new(config.message_api.clone());
        Self {
            dialog_visible: RwSignal::new(false),
            dialog_mode: RwSignal::new(DialogMode::Add),
            form_data: RwSignal::new(config.initial_form_data.clone()),
            submit_loading: RwSignal::new(false),
            form_loading: RwSignal::new(false),
            validation_errors: RwSignal::new(HashMap::new()),
            inner: Rc::new(FormDialogInner { config, messenger }),
        }
    }

    /// Открывает диалог. При редактировании с настроенным `get_api` запись
    /// загружается по `row.id` (или по самому `row`, если это не объект с id).
    pub async fn open_dialog(&self, mode: DialogMode, row: Option<Value>) {
        self.dialog_mode.set(mode);
        self.dialog_visible.set(true);
        if mode != DialogMode::Edit {
            return;
        }

        let config = &self.inner.config;
        let Some(get_api) = &config.get_api else {
            if let Some(row) = row {
                self.fill_form(row);
            }
            return;
        };

        let _loading = LoadingGuard::acquire(self.form_loading);
        let response = match get_api(record_id(row)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Ошибка загрузки записи для редактирования: {}", e);
                self.inner
                    .messenger
                    .error(&format!("Не удалось получить данные: {}", e.message));
                return;
            }
        };
        self.fill_form(response_data(&response));
    }

    fn fill_form(&self, data: Value) {
        let data = match &self.inner.config.data_transform.after_get {
            Some(after_get) => after_get(data),
            None => data,
        };
        match serde_json::from_value::<T>(data) {
            Ok(form) => self.form_data.set(form),
            Err(e) => {
                error!("Данные записи не соответствуют форме: {}", e);
                self.inner
                    .messenger
                    .error(&format!("Не удалось получить данные: {}", e));
            }
        }
    }

    /// Проверяет форму по правилам и публикует ошибки в `validation_errors`
    pub fn validate(&self) -> bool {
        let errors = self
            .form_data
            .with_untracked(|form| self.inner.config.form_rules.validate(form));
        let valid = errors.is_empty();
        self.validation_errors.set(errors);
        valid
    }

    pub fn field_error(&self, field: &str) -> Option<String> {
        self.validation_errors.with(|errors| errors.get(field).cloned())
    }

    pub async fn submit_form(&self) {
        // ошибки проверки показывает сама форма
        if !self.validate() {
            return;
        }

        let config = &self.inner.config;
        let messenger = &self.inner.messenger;
        let loading = LoadingGuard::acquire(self.submit_loading);

        let form = self.form_data.get_untracked();
        let raw = match serde_json::to_value(&form) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Не удалось сериализовать форму: {}", e);
                messenger.error(&format!("Не удалось сохранить: {}", e));
                return;
            }
        };
        let payload = match &config.data_transform.before_submit {
            Some(before_submit) => before_submit(raw),
            None => Some(raw),
        };
        let Some(payload) = payload.filter(|payload| !payload.is_null()) else {
            log!("Отправка формы отменена в before_submit");
            return;
        };

        let mode = self.dialog_mode.get_untracked();
        let api = match mode {
            DialogMode::Add => &config.add_api,
            DialogMode::Edit => &config.update_api,
        };
        let response = match api(payload).await {
            Ok(response) => response,
            Err(e) => {
                error!("Ошибка сохранения формы ({}): {}", mode.as_str(), e);
                messenger.error(&format!("Не удалось сохранить: {}", e.message));
                return;
            }
        };

        messenger.success(&response_message(&response).unwrap_or_else(|| config.success_message.clone()));

        if let Some(on_submit_success) = &config.on_submit_success {
            if let Err(e) = on_submit_success(response, mode, form).await {
                error!("Ошибка в обработчике успешной отправки: {}", e);
            }
        }

        self.handle_dialog_close();
        drop(loading);

        if let Some(on_success) = &config.on_success {
            on_success().await;
        }
    }

    /// Возвращает форму к копии шаблона; ошибки проверки очищаются на следующем тике
    pub fn reset_form(&self) {
        self.form_data.set(self.inner.config.initial_form_data.clone());
        self.clear_validation();
    }

    #[cfg(target_arch = "wasm32")]
    fn clear_validation(&self) {
        let errors = self.validation_errors;
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(0).await;
            errors.set(HashMap::new());
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn clear_validation(&self) {
        self.validation_errors.set(HashMap::new());
    }

    pub fn handle_dialog_close(&self) {
        self.reset_form();
        self.dialog_visible.set(false);
    }
}

fn record_id(row: Option<Value>) -> Value {
    match row {
        Some(Value::Object(record)) if record.contains_key("id") => record.get("id").cloned().unwrap_or_default(),
        Some(other) => other,
        None => Value::Null,
    }
}

pub fn use_form_dialog<T: CrudRecord>(config: FormDialogConfig<T>) -> FormDialog<T> {
    FormDialog::new(config)
}

#[cfg(test)]
mod tests;
