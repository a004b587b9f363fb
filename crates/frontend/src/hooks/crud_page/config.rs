use crate::hooks::form_dialog::{AfterGet, BeforeSubmit, DataTransformConfig, FormRules, SubmitSuccess};
use crate::hooks::table_page::{BatchDeleteSuccess, DeleteSuccess, PreprocessParams};
use crate::shared::api::{AsyncCallback, IdsApi, ListApi, UnitApi, ValueApi};
use crate::shared::export::ExportFunction;
use crate::shared::message::MessageApi;
use crate::shared::table_config::{ActionHandler, CustomTableConfig};
use contracts::shared::crud::TimeField;
use contracts::shared::paging::{ListResultKeys, DEFAULT_PAGE_SIZE};
use contracts::shared::transform::Record;
use std::rc::Rc;

/// Полная конфигурация CRUD-страницы: `R` - строка таблицы, `F` - данные формы
pub struct CrudPageConfig<R, F> {
    pub list_api: ListApi,
    pub add_api: ValueApi,
    pub update_api: ValueApi,
    pub get_api: Option<ValueApi>,
    pub delete_api: Option<ValueApi>,
    pub batch_delete_api: Option<IdsApi>,
    pub delete_all_api: Option<UnitApi>,

    pub initial_form_data: F,
    pub form_rules: FormRules<F>,
    /// Вызывается после перезагрузки списка при успешной отправке формы
    pub on_success: Option<AsyncCallback>,
    pub on_submit_success: Option<SubmitSuccess<F>>,
    /// Пользовательские преобразования; склейка/разбиение `array_fields` добавляется вокруг них
    pub data_transform: DataTransformConfig,

    pub initial_search_form: Record,
    pub result_keys: ListResultKeys,
    pub auto_fetch: bool,
    pub page_size: u64,
    pub preprocess_params: Option<PreprocessParams>,
    pub custom_table_config: Option<CustomTableConfig<R>>,
    /// Запасной обработчик событий строки, если в конфигурации таблицы его нет
    pub on_custom_action: Option<ActionHandler<R>>,
    pub array_fields: Vec<String>,
    pub time_fields: Vec<TimeField>,

    pub id_key: String,
    pub confirm_message: String,
    pub batch_confirm_message: String,
    pub delete_all_confirm_message: String,
    pub on_delete_success: Option<DeleteSuccess<R>>,
    pub on_batch_delete_success: Option<BatchDeleteSuccess<R>>,

    pub export_function: Option<ExportFunction>,
    pub export_url: Option<String>,
    pub message_api: MessageApi,
}

impl<R, F> CrudPageConfig<R, F> {
    pub fn new(list_api: ListApi, add_api: ValueApi, update_api: ValueApi, initial_form_data: F) -> Self {
        Self {
            list_api,
            add_api,
            update_api,
            get_api: None,
            delete_api: None,
            batch_delete_api: None,
            delete_all_api: None,
            initial_form_data,
            form_rules: FormRules::default(),
            on_success: None,
            on_submit_success: None,
            data_transform: DataTransformConfig::default(),
            initial_search_form: Record::new(),
            result_keys: ListResultKeys::default(),
            auto_fetch: true,
            page_size: DEFAULT_PAGE_SIZE,
            preprocess_params: None,
            custom_table_config: None,
            on_custom_action: None,
            array_fields: Vec::new(),
            time_fields: Vec::new(),
            id_key: "id".to_string(),
            confirm_message: "Удалить текущую запись?".to_string(),
            batch_confirm_message: "Удалить выбранные записи?".to_string(),
            delete_all_confirm_message: "Удалить все данные?".to_string(),
            on_delete_success: None,
            on_batch_delete_success: None,
            export_function: None,
            export_url: None,
            message_api: MessageApi::default(),
        }
    }
}

pub struct SimpleApis {
    pub list: ListApi,
    pub add: ValueApi,
    pub update: ValueApi,
    pub delete: Option<ValueApi>,
    pub batch_delete: Option<IdsApi>,
    pub get: Option<ValueApi>,
    /// Получает только параметры выгрузки
    pub export: Option<Rc<dyn Fn(Record)>>,
}

impl SimpleApis {
    pub fn new(list: ListApi, add: ValueApi, update: ValueApi) -> Self {
        Self {
            list,
            add,
            update,
            delete: None,
            batch_delete: None,
            get: None,
            export: None,
        }
    }
}

pub struct SimpleForm<F> {
    pub initial_data: F,
    pub rules: FormRules<F>,
    pub before_submit: Option<BeforeSubmit>,
    pub after_get: Option<AfterGet>,
    pub on_success: Option<AsyncCallback>,
    pub on_submit_success: Option<SubmitSuccess<F>>,
}

impl<F> SimpleForm<F> {
    pub fn new(initial_data: F) -> Self {
        Self {
            initial_data,
            rules: FormRules::default(),
            before_submit: None,
            after_get: None,
            on_success: None,
            on_submit_success: None,
        }
    }
}

pub struct SimpleTable<R> {
    pub config: Option<CustomTableConfig<R>>,
    pub data_key: Option<String>,
    pub total_key: Option<String>,
    pub auto_fetch: bool,
    pub export_url: Option<String>,
    pub on_custom_action: Option<ActionHandler<R>>,
}

impl<R> Default for SimpleTable<R> {
    fn default() -> Self {
        Self {
            config: None,
            data_key: None,
            total_key: None,
            auto_fetch: true,
            export_url: None,
            on_custom_action: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct SimpleSearch {
    pub initial_data: Record,
    pub before_search: Option<PreprocessParams>,
}

pub struct SimpleCallbacks<R> {
    pub on_delete_success: Option<DeleteSuccess<R>>,
    pub on_batch_delete_success: Option<BatchDeleteSuccess<R>>,
}

impl<R> Default for SimpleCallbacks<R> {
    fn default() -> Self {
        Self {
            on_delete_success: None,
            on_batch_delete_success: None,
        }
    }
}

pub struct SimpleAdvanced<R> {
    pub array_fields: Vec<String>,
    pub time_fields: Vec<TimeField>,
    pub callbacks: SimpleCallbacks<R>,
    pub message_api: MessageApi,
}

impl<R> Default for SimpleAdvanced<R> {
    fn default() -> Self {
        Self {
            array_fields: Vec::new(),
            time_fields: Vec::new(),
            callbacks: SimpleCallbacks::default(),
            message_api: MessageApi::default(),
        }
    }
}

/// Упрощённая плоская конфигурация для типовых страниц
pub struct SimpleCrudConfig<R, F> {
    pub apis: SimpleApis,
    pub form: SimpleForm<F>,
    pub table: SimpleTable<R>,
    pub search: Option<SimpleSearch>,
    pub advanced: SimpleAdvanced<R>,
}

impl<R, F> SimpleCrudConfig<R, F> {
    pub fn new(apis: SimpleApis, form: SimpleForm<F>) -> Self {
        Self {
            apis,
            form,
            table: SimpleTable::default(),
            search: None,
            advanced: SimpleAdvanced::default(),
        }
    }

    /// Раскладывает упрощённую конфигурацию в полную. Удаление всех данных
    /// в упрощённой форме не задаётся.
    pub fn into_full(self) -> CrudPageConfig<R, F> {
        let SimpleCrudConfig {
            apis,
            form,
            table,
            search,
            advanced,
        } = self;

        let mut result_keys = ListResultKeys::default();
        if let Some(data_key) = table.data_key {
            result_keys.data_key = data_key;
        }
        if let Some(total_key) = table.total_key {
            result_keys.total_key = total_key;
        }
        let search = search.unwrap_or_default();
        let export_function = apis.export.map(|export| -> ExportFunction {
            Rc::new(move |_url: &str, params: Record, _filename: String| export(params))
        });

        let mut config = CrudPageConfig::new(apis.list, apis.add, apis.update, form.initial_data);
        config.get_api = apis.get;
        config.delete_api = apis.delete;
        config.batch_delete_api = apis.batch_delete;
        config.delete_all_api = None;

        config.form_rules = form.rules;
        config.on_success = form.on_success;
        config.on_submit_success = form.on_submit_success;
        config.data_transform = DataTransformConfig {
            before_submit: form.before_submit,
            after_get: form.after_get,
        };

        config.initial_search_form = search.initial_data;
        config.preprocess_params = search.before_search;
        config.result_keys = result_keys;
        config.auto_fetch = table.auto_fetch;
        config.custom_table_config = table.config;
        config.on_custom_action = table.on_custom_action;
        config.export_url = table.export_url;
        config.export_function = export_function;

        config.array_fields = advanced.array_fields;
        config.time_fields = advanced.time_fields;
        config.on_delete_success = advanced.callbacks.on_delete_success;
        config.on_batch_delete_success = advanced.callbacks.on_batch_delete_success;
        config.message_api = advanced.message_api;
        config
    }
}

/// Любая из двух форм конфигурации; приводится к полной один раз при создании страницы
pub enum CrudConfig<R, F> {
    Simple(SimpleCrudConfig<R, F>),
    Full(CrudPageConfig<R, F>),
}

impl<R, F> CrudConfig<R, F> {
    pub fn normalize(self) -> CrudPageConfig<R, F> {
        match self {
            CrudConfig::Simple(simple) => simple.into_full(),
            CrudConfig::Full(full) => full,
        }
    }
}

impl<R, F> From<SimpleCrudConfig<R, F>> for CrudConfig<R, F> {
    fn from(config: SimpleCrudConfig<R, F>) -> Self {
        CrudConfig::Simple(config)
    }
}

impl<R, F> From<CrudPageConfig<R, F>> for CrudConfig<R, F> {
    fn from(config: CrudPageConfig<R, F>) -> Self {
        CrudConfig::Full(config)
    }
}
