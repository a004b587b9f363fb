use crate::shared::api::{IdsApi, UnitApi, ValueApi};
use crate::shared::export::ExportFunction;
use crate::shared::message::MessageApi;
use crate::shared::table_config::CustomTableConfig;
use contracts::shared::crud::TimeField;
use contracts::shared::paging::{ListResultKeys, DEFAULT_PAGE_SIZE};
use contracts::shared::transform::Record;
use std::rc::Rc;

/// Предобработка параметров запроса; `None` - запрос не выполнять
pub type PreprocessParams = Rc<dyn Fn(Record) -> Option<Record>>;

/// Настройки списка
pub struct TablePageConfig<T> {
    /// Ключи строк/количества в ответе и режим автоопределения
    pub result_keys: ListResultKeys,
    /// Загрузить данные сразу после создания хука
    pub auto_fetch: bool,
    pub page_size: u64,
    pub preprocess_params: Option<PreprocessParams>,
    pub custom_table_config: Option<CustomTableConfig<T>>,
    /// Поля-массивы, склеиваемые в строку перед запросом
    pub array_fields: Vec<String>,
    /// Поля-диапазоны дат, раскладываемые на два ключа перед запросом
    pub time_fields: Vec<TimeField>,
    pub message_api: MessageApi,
}

impl<T> Default for TablePageConfig<T> {
    fn default() -> Self {
        Self {
            result_keys: ListResultKeys::default(),
            auto_fetch: true,
            page_size: DEFAULT_PAGE_SIZE,
            preprocess_params: None,
            custom_table_config: None,
            array_fields: Vec::new(),
            time_fields: Vec::new(),
            message_api: MessageApi::default(),
        }
    }
}

pub type DeleteSuccess<T> = Rc<dyn Fn(&T)>;
pub type BatchDeleteSuccess<T> = Rc<dyn Fn(&[T], bool)>;

/// Настройки удаления
pub struct DeleteConfig<T> {
    pub delete_api: Option<ValueApi>,
    pub batch_delete_api: Option<IdsApi>,
    pub delete_all_api: Option<UnitApi>,
    /// Поле первичного ключа строки
    pub id_key: String,
    pub confirm_message: String,
    pub batch_confirm_message: String,
    pub delete_all_confirm_message: String,
    /// Если задан, вызывается вместо перезагрузки списка
    pub on_delete_success: Option<DeleteSuccess<T>>,
    /// `(удалённые строки, удалено ли всё)`; если задан, вызывается вместо перезагрузки
    pub on_batch_delete_success: Option<BatchDeleteSuccess<T>>,
}

impl<T> Default for DeleteConfig<T> {
    fn default() -> Self {
        Self {
            delete_api: None,
            batch_delete_api: None,
            delete_all_api: None,
            id_key: "id".to_string(),
            confirm_message: "Удалить текущую запись?".to_string(),
            batch_confirm_message: "Удалить выбранные записи?".to_string(),
            delete_all_confirm_message: "Удалить все данные?".to_string(),
            on_delete_success: None,
            on_batch_delete_success: None,
        }
    }
}

/// Настройки выгрузки
#[derive(Clone, Default)]
pub struct ExportConfig {
    pub export_function: Option<ExportFunction>,
    /// Переопределяют поля списка, если заданы
    pub array_fields: Option<Vec<String>>,
    pub time_fields: Option<Vec<TimeField>>,
    pub id_key: Option<String>,
}
