//! CRUD-страница: таблица и диалог формы, связанные между собой.
//!
//! Собственного состояния у страницы нет, кроме флага диалога импорта.
//! Успешная отправка формы перезагружает список, событие `edit` открывает форму.

mod config;

pub use config::{
    CrudConfig, CrudPageConfig, SimpleAdvanced, SimpleApis, SimpleCallbacks, SimpleCrudConfig, SimpleForm,
    SimpleSearch, SimpleTable,
};

use crate::hooks::form_dialog::{AfterGet, BeforeSubmit, DataTransformConfig, FormDialog, FormDialogConfig};
use crate::hooks::table_page::{
    ActionRoute, DeleteConfig, ExportConfig, TableEventHandlers, TablePage, TablePageConfig,
};
use crate::shared::api::{async_callback, CrudRecord, TaskFuture};
use crate::shared::table_config::{ActionHandler, TableView};
use contracts::shared::crud::DialogMode;
use contracts::shared::transform::{array_to_string, string_to_array, Record, DEFAULT_SEPARATOR};
use leptos::logging::{error, warn};
use leptos::prelude::*;
use serde_json::Value;
use std::rc::Rc;

/// Состояние и операции CRUD-страницы
#[derive(Clone)]
pub struct CrudPage<R: CrudRecord, F: CrudRecord> {
    pub table: TablePage<R>,
    pub form: FormDialog<F>,
    pub import_dialog_visible: RwSignal<bool>,
    display_action: Option<ActionHandler<R>>,
    fallback_action: Option<ActionHandler<R>>,
    export_url: Option<String>,
}

impl<R: CrudRecord, F: CrudRecord> CrudPage<R, F> {
    pub fn new(config: impl Into<CrudConfig<R, F>>) -> Self {
        let config = config.into().normalize();

        let display_action = config
            .custom_table_config
            .as_ref()
            .and_then(|custom| custom.on_custom_action.clone());

        let table = TablePage::new(
            config.list_api,
            config.initial_search_form,
            TablePageConfig {
                result_keys: config.result_keys,
                auto_fetch: config.auto_fetch,
                page_size: config.page_size,
                preprocess_params: config.preprocess_params,
                custom_table_config: config.custom_table_config,
                array_fields: config.array_fields.clone(),
                time_fields: config.time_fields.clone(),
                message_api: config.message_api.clone(),
            },
            DeleteConfig {
                delete_api: config.delete_api,
                batch_delete_api: config.batch_delete_api,
                delete_all_api: config.delete_all_api,
                id_key: config.id_key.clone(),
                confirm_message: config.confirm_message,
                batch_confirm_message: config.batch_confirm_message,
                delete_all_confirm_message: config.delete_all_confirm_message,
                on_delete_success: config.on_delete_success,
                on_batch_delete_success: config.on_batch_delete_success,
            },
            ExportConfig {
                export_function: config.export_function,
                array_fields: Some(config.array_fields.clone()),
                time_fields: Some(config.time_fields.clone()),
                id_key: Some(config.id_key),
            },
        );

        let refetch = table.clone();
        let caller_on_success = config.on_success;
        let on_success = async_callback(move || {
            let table = refetch.clone();
            let caller_on_success = caller_on_success.clone();
            async move {
                table.get_table_data().await;
                if let Some(on_success) = caller_on_success {
                    on_success().await;
                }
            }
        });

        let mut form_config = FormDialogConfig::new(config.initial_form_data, config.add_api, config.update_api);
        form_config.get_api = config.get_api;
        form_config.form_rules = config.form_rules;
        form_config.on_success = Some(on_success);
        form_config.on_submit_success = config.on_submit_success;
        form_config.message_api = config.message_api;
        form_config.data_transform = DataTransformConfig {
            before_submit: Some(before_submit_pipeline(
                config.array_fields.clone(),
                config.data_transform.before_submit,
            )),
            after_get: Some(after_get_pipeline(config.array_fields, config.data_transform.after_get)),
        };

        Self {
            table,
            form: FormDialog::new(form_config),
            import_dialog_visible: RwSignal::new(false),
            display_action,
            fallback_action: config.on_custom_action,
            export_url: config.export_url,
        }
    }

    pub async fn mounted(&self) {
        self.table.mounted().await;
    }

    /// Конфигурация компонента таблицы; `None`, если таблица не настроена
    pub fn table_config(&self) -> Option<TableView> {
        self.table.table_config()
    }

    /// Обработчики таблицы: `edit` открывает форму, остальное уходит в маршрутизатор таблицы
    pub fn table_event_handlers(&self) -> TableEventHandlers<R> {
        let base = self.table.table_event_handlers();
        let default_action = base.on_action.clone();
        let page = self.clone();
        let on_action: ActionRoute<R> = Rc::new(move |event: String, row: R, index: usize| -> TaskFuture {
            let page = page.clone();
            let default_action = default_action.clone();
            Box::pin(async move {
                if event == "edit" {
                    page.open_edit(&row).await;
                    return;
                }
                match default_action {
                    Some(route) => route(event, row, index).await,
                    None => page.handle_custom_action(&event, &row, index),
                }
            })
        });

        TableEventHandlers {
            on_action: Some(on_action),
            ..base
        }
    }

    async fn open_edit(&self, row: &R) {
        match serde_json::to_value(row) {
            Ok(row) => self.form.open_dialog(DialogMode::Edit, Some(row)).await,
            Err(e) => error!("Не удалось подготовить строку к редактированию: {}", e),
        }
    }

    /// Пользовательское событие строки: обработчик из конфигурации таблицы,
    /// затем обработчик из упрощённой конфигурации
    pub fn handle_custom_action(&self, event: &str, row: &R, index: usize) {
        match self.display_action.as_ref().or(self.fallback_action.as_ref()) {
            Some(handler) => handler(event, row, index),
            None => warn!("Не найден обработчик события \"{}\" (строка {})", event, index),
        }
    }

    /// Открывает диалог импорта; сам импорт подключает вызывающий код
    pub fn handle_batch_import(&self) {
        self.import_dialog_visible.set(true);
    }

    pub fn handle_export(&self, url: &str, filename: &str, params: Option<Record>) {
        self.table.handle_export(url, filename, params);
    }

    /// Адрес выгрузки из конфигурации страницы
    pub fn export_url(&self) -> Option<&str> {
        self.export_url.as_deref()
    }
}

/// Перед отправкой: склейка массивов, затем пользовательское преобразование
fn before_submit_pipeline(array_fields: Vec<String>, custom: Option<BeforeSubmit>) -> BeforeSubmit {
    Rc::new(move |data: Value| {
        let joined = match data {
            Value::Object(record) if !array_fields.is_empty() => {
                Value::Object(array_to_string(&record, &array_fields, DEFAULT_SEPARATOR))
            }
            other => other,
        };
        match &custom {
            Some(before_submit) => before_submit(joined),
            None => Some(joined),
        }
    })
}

/// После загрузки: пользовательское преобразование, затем разбиение строк в массивы
fn after_get_pipeline(array_fields: Vec<String>, custom: Option<AfterGet>) -> AfterGet {
    Rc::new(move |data: Value| {
        let data = match &custom {
            Some(after_get) => after_get(data),
            None => data,
        };
        match data {
            Value::Object(record) if !array_fields.is_empty() => {
                Value::Object(string_to_array(&record, &array_fields, DEFAULT_SEPARATOR))
            }
            other => other,
        }
    })
}

/// Создаёт страницу и при `auto_fetch` запускает первую загрузку списка
pub fn use_crud_page<R: CrudRecord, F: CrudRecord>(config: impl Into<CrudConfig<R, F>>) -> CrudPage<R, F> {
    let page = CrudPage::new(config);
    let mounted = page.clone();
    leptos::task::spawn_local(async move { mounted.mounted().await });
    page
}
