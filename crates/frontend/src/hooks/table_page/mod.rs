//! Хук страницы-таблицы: загрузка списка, пагинация, поиск, выбор строк,
//! удаление (одиночное, пакетное, всех данных) и выгрузка.
//!
//! Состояние живёт в сигналах и принадлежит только этому экземпляру хука.
//! Все операции асинхронные и никогда не возвращают ошибку: сбой пишется в лог
//! (и при удалении - в канал сообщений), флаги загрузки снимаются на любом выходе.

mod config;

pub use config::{
    BatchDeleteSuccess, DeleteConfig, DeleteSuccess, ExportConfig, PreprocessParams, TablePageConfig,
};

use super::LoadingGuard;
use crate::shared::api::{field_of, not_configured, CrudRecord, ListApi, TaskFuture};
use crate::shared::export::export_filename;
use crate::shared::message::Messenger;
use crate::shared::table_config::{ActionHandler, TableColumn, TableView};
use contracts::shared::crud::{response_message, shape_query};
use contracts::shared::error::ApiResult;
use contracts::shared::paging::{parse_list_result, PageInfo, PaginationChange};
use contracts::shared::transform::Record;
use leptos::logging::{error, log};
use leptos::prelude::*;
use serde_json::Value;
use std::rc::Rc;

const DELETE_SUCCESS_MESSAGE: &str = "Удалено успешно";
const NOTHING_TO_DELETE_MESSAGE: &str = "Нет данных для удаления";
const EXPORT_NOT_CONFIGURED_MESSAGE: &str = "Экспорт не настроен";

struct TablePageInner<T> {
    list_api: ListApi,
    initial_search: Record,
    config: TablePageConfig<T>,
    delete: DeleteConfig<T>,
    export: ExportConfig,
    messenger: Messenger,
}

/// Состояние и операции страницы-таблицы
#[derive(Clone)]
pub struct TablePage<T: CrudRecord> {
    pub table_data: RwSignal<Vec<T>>,
    pub loading: RwSignal<bool>,
    pub delete_loading: RwSignal<bool>,
    pub page_info: RwSignal<PageInfo>,
    pub search_params: RwSignal<Record>,
    pub selected_rows: RwSignal<Vec<T>>,
    /// Значения `id_key` выбранных строк
    pub selected_ids: Signal<Vec<Value>>,
    columns: RwSignal<Vec<TableColumn>>,
    latest_request: StoredValue<u64>,
    inner: Rc<TablePageInner<T>>,
}

impl<T: CrudRecord> TablePage<T> {
    /// Создаёт хук без автозагрузки; см. `use_table_page` для поведения при монтировании
    pub fn new(
        list_api: ListApi,
        search_form: Record,
        config: TablePageConfig<T>,
        delete: DeleteConfig<T>,
        export: ExportConfig,
    ) -> Self {
        let page_info = PageInfo {
            page_size: config.page_size.max(1),
            ..PageInfo::default()
        };
        let columns = config
            .custom_table_config
            .as_ref()
            .map(|custom| custom.columns.clone())
            .unwrap_or_default();

        let selected_rows = RwSignal::new(Vec::<T>::new());
        let id_key = delete.id_key.clone();
        let selected_ids = Signal::derive(move || {
            selected_rows.with(|rows| rows.iter().map(|row| field_of(row, &id_key)).collect())
        });

        let messenger = Messenger::new(config.message_api.clone());

        Self {
            table_data: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            delete_loading: RwSignal::new(false),
            page_info: RwSignal::new(page_info),
            search_params: RwSignal::new(search_form.clone()),
            selected_rows,
            selected_ids,
            columns: RwSignal::new(columns),
            latest_request: StoredValue::new(0),
            inner: Rc::new(TablePageInner {
                list_api,
                initial_search: search_form,
                config,
                delete,
                export,
                messenger,
            }),
        }
    }

    /// Действие при монтировании: загрузка, если включён `auto_fetch`
    pub async fn mounted(&self) {
        if self.inner.config.auto_fetch {
            self.get_table_data().await;
        }
    }

    /// Загружает текущую страницу.
    ///
    /// Ответ запроса, после которого был запущен более новый, отбрасывается.
    /// Пропущенный `preprocess_params` вызов новым запросом не считается.
    pub async fn get_table_data(&self) {
        let config = &self.inner.config;
        let page = self.page_info.get_untracked();
        let mut params = page.to_query();
        params.extend(self.search_params.get_untracked());
        params = shape_query(&params, &config.time_fields, &config.array_fields);

        if let Some(preprocess) = &config.preprocess_params {
            match preprocess(params) {
                Some(processed) => {
                    let mut merged = page.to_query();
                    merged.extend(processed);
                    params = merged;
                }
                // поиск ещё не готов - запрос не выполняем
                None => {
                    self.loading.set(false);
                    return;
                }
            }
        }

        let seq = self.latest_request.get_value() + 1;
        self.latest_request.set_value(seq);
        let _loading = LoadingGuard::acquire_for_request(self.loading, self.latest_request, seq);

        let result = (self.inner.list_api)(params).await;
        if self.latest_request.get_value() != seq {
            log!("Ответ устаревшего запроса списка #{} отброшен", seq);
            return;
        }

        match result.and_then(|response| self.parse_rows(&response)) {
            Ok((rows, total)) => {
                self.table_data.set(rows);
                self.page_info.update(|p| p.total = total);
            }
            Err(e) => {
                error!("Ошибка загрузки данных таблицы: {}", e);
                self.table_data.set(Vec::new());
                self.page_info.update(|p| p.total = 0);
            }
        }
    }

    fn parse_rows(&self, response: &Value) -> ApiResult<(Vec<T>, u64)> {
        let parsed = parse_list_result(response, &self.inner.config.result_keys);
        let rows = parsed
            .rows
            .into_iter()
            .map(serde_json::from_value::<T>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((rows, parsed.total))
    }

    pub async fn handle_search(&self) {
        self.page_info.update(|p| p.page_num = 1);
        self.get_table_data().await;
    }

    /// Сбрасывает поиск к начальному снимку и загружает первую страницу
    pub async fn handle_reset(&self) {
        self.page_info.update(|p| p.page_num = 1);
        self.search_params.set(self.inner.initial_search.clone());
        self.get_table_data().await;
    }

    pub async fn handle_page_change(&self, page: u64) {
        self.page_info.update(|p| p.page_num = page.max(1));
        self.get_table_data().await;
    }

    pub async fn handle_size_change(&self, size: u64) {
        self.page_info.update(|p| {
            p.page_size = size.max(1);
            p.page_num = 1;
        });
        self.get_table_data().await;
    }

    /// Событие компонента пагинации: страница и размер сразу
    pub async fn handle_pagination(&self, change: PaginationChange) {
        self.page_info.update(|p| {
            p.page_num = change.page.max(1);
            p.page_size = change.limit.max(1);
        });
        self.get_table_data().await;
    }

    pub fn handle_selection_change(&self, rows: Vec<T>) {
        self.selected_rows.set(rows);
    }

    /// Заменяет колонки таблицы; без конфигурации таблицы ничего не делает
    pub fn set_table_columns(&self, columns: Vec<TableColumn>) {
        if self.inner.config.custom_table_config.is_some() {
            self.columns.set(columns);
        }
    }

    /// Удаление одной строки после подтверждения
    pub async fn handle_delete(&self, row: T) {
        let delete = &self.inner.delete;
        let messenger = &self.inner.messenger;
        if messenger.confirm(&delete.confirm_message, None, None).await.is_err() {
            return;
        }

        let _loading = LoadingGuard::acquire(self.delete_loading);
        let id = field_of(&row, &delete.id_key);
        let request = match &delete.delete_api {
            Some(api) => api(id),
            None => not_configured("deleteApi"),
        };
        let response = match request.await {
            Ok(response) => response,
            Err(e) => {
                error!("Ошибка удаления: {}", e);
                messenger.error(&format!("Не удалось удалить: {}", e.message));
                return;
            }
        };

        messenger.success(&response_message(&response).unwrap_or_else(|| DELETE_SUCCESS_MESSAGE.to_string()));

        // удалили последнюю строку страницы - уходим на предыдущую
        if self.table_data.with_untracked(Vec::len) == 1 {
            self.page_info.update(PageInfo::step_back);
        }

        match &delete.on_delete_success {
            Some(callback) => callback(&row),
            None => self.get_table_data().await,
        }
    }

    /// Пакетное удаление выбранных строк; без выбора - удаление всех данных
    pub async fn handle_batch_delete(&self) {
        let delete = &self.inner.delete;
        let messenger = &self.inner.messenger;
        if self.table_data.with_untracked(Vec::is_empty) {
            messenger.warning(NOTHING_TO_DELETE_MESSAGE);
            return;
        }

        let ids = self.selected_ids.get_untracked();
        let delete_all = ids.is_empty();
        let confirm_message = if delete_all {
            delete.delete_all_confirm_message.clone()
        } else {
            format!("{} (всего: {})", delete.batch_confirm_message, ids.len())
        };
        if messenger.confirm(&confirm_message, None, None).await.is_err() {
            return;
        }

        let _loading = LoadingGuard::acquire(self.delete_loading);
        let request = if delete_all {
            match &delete.delete_all_api {
                Some(api) => api(),
                None => not_configured("deleteAllApi"),
            }
        } else {
            match &delete.batch_delete_api {
                Some(api) => api(ids.clone()),
                None => not_configured("batchDeleteApi"),
            }
        };
        let response = match request.await {
            Ok(response) => response,
            Err(e) => {
                if delete_all {
                    error!("Ошибка удаления всех данных: {}", e);
                } else {
                    error!("Ошибка пакетного удаления: {}", e);
                }
                messenger.error(&format!("Не удалось удалить: {}", e.message));
                return;
            }
        };

        messenger.success(&response_message(&response).unwrap_or_else(|| DELETE_SUCCESS_MESSAGE.to_string()));

        let deleted_rows = if delete_all {
            self.table_data.get_untracked()
        } else {
            self.selected_rows.get_untracked()
        };
        if delete_all {
            self.page_info.update(|p| p.page_num = 1);
        } else if self.table_data.with_untracked(Vec::len) <= ids.len() {
            self.page_info.update(PageInfo::step_back);
        }
        self.selected_rows.set(Vec::new());

        match &delete.on_batch_delete_success {
            Some(callback) => callback(&deleted_rows, delete_all),
            None => self.get_table_data().await,
        }
    }

    /// Выгрузка: параметры поиска + id выбранных строк, имя файла с меткой времени
    pub fn handle_export(&self, url: &str, filename: &str, params: Option<Record>) {
        let export = &self.inner.export;
        let Some(export_function) = &export.export_function else {
            error!("Не настроена функция экспорта, выгрузка невозможна");
            self.inner.messenger.warning(EXPORT_NOT_CONFIGURED_MESSAGE);
            return;
        };

        let id_key = export.id_key.as_deref().unwrap_or(&self.inner.delete.id_key);
        let ids: Vec<Value> = self
            .selected_rows
            .with_untracked(|rows| rows.iter().map(|row| field_of(row, id_key)).collect());

        let mut query = params.unwrap_or_default();
        query.extend(self.search_params.get_untracked());
        query.insert("ids".to_string(), Value::Array(ids));

        let config = &self.inner.config;
        let time_fields = export.time_fields.as_ref().unwrap_or(&config.time_fields);
        let array_fields = export.array_fields.as_ref().unwrap_or(&config.array_fields);
        let shaped = shape_query(&query, time_fields, array_fields);

        let filename = export_filename(filename, chrono::Utc::now().timestamp_millis());
        export_function(url, shaped, filename);
    }

    /// Конфигурация для компонента таблицы; `None`, если таблица не настроена
    pub fn table_config(&self) -> Option<TableView> {
        let custom = self.inner.config.custom_table_config.as_ref()?;
        let has_rows = self.table_data.with(|rows| !rows.is_empty());
        Some(TableView::build(custom, self.columns.get(), self.page_info.get(), has_rows))
    }

    /// Обработчик пользовательских событий из конфигурации таблицы
    pub fn custom_action_handler(&self) -> Option<ActionHandler<T>> {
        self.inner
            .config
            .custom_table_config
            .as_ref()
            .and_then(|custom| custom.on_custom_action.clone())
    }

    /// `delete` - удаление строки, остальное - в пользовательский обработчик
    pub async fn route_action(&self, event: &str, row: T, index: usize) {
        match event {
            "delete" => self.handle_delete(row).await,
            _ => match self.custom_action_handler() {
                Some(handler) => handler(event, &row, index),
                None => log!("Необработанное событие таблицы: {} (строка {})", event, index),
            },
        }
    }

    /// Обработчики событий компонента таблицы
    pub fn table_event_handlers(&self) -> TableEventHandlers<T> {
        let page = self.clone();
        let on_selection_change: Rc<dyn Fn(Vec<T>)> = Rc::new(move |rows: Vec<T>| page.handle_selection_change(rows));

        let page = self.clone();
        let on_pagination: Rc<dyn Fn(PaginationChange) -> TaskFuture> = Rc::new(move |change: PaginationChange| -> TaskFuture {
            let page = page.clone();
            Box::pin(async move { page.handle_pagination(change).await })
        });

        let page = self.clone();
        let on_action: ActionRoute<T> = Rc::new(move |event: String, row: T, index: usize| -> TaskFuture {
            let page = page.clone();
            Box::pin(async move { page.route_action(&event, row, index).await })
        });

        TableEventHandlers {
            on_selection_change,
            on_pagination,
            on_action: Some(on_action),
        }
    }
}

/// Асинхронный маршрутизатор события строки: `(event, row, index)`
pub type ActionRoute<T> = Rc<dyn Fn(String, T, usize) -> TaskFuture>;

/// Обработчики событий компонента таблицы
pub struct TableEventHandlers<T> {
    pub on_selection_change: Rc<dyn Fn(Vec<T>)>,
    pub on_pagination: Rc<dyn Fn(PaginationChange) -> TaskFuture>,
    pub on_action: Option<ActionRoute<T>>,
}

impl<T> Clone for TableEventHandlers<T> {
    fn clone(&self) -> Self {
        Self {
            on_selection_change: self.on_selection_change.clone(),
            on_pagination: self.on_pagination.clone(),
            on_action: self.on_action.clone(),
        }
    }
}

/// Создаёт хук и при `auto_fetch` запускает первую загрузку
pub fn use_table_page<T: CrudRecord>(
    list_api: ListApi,
    search_form: Record,
    config: TablePageConfig<T>,
    delete: DeleteConfig<T>,
    export: ExportConfig,
) -> TablePage<T> {
    let page = TablePage::new(list_api, search_form, config, delete, export);
    let mounted = page.clone();
    leptos::task::spawn_local(async move { mounted.mounted().await });
    page
}
