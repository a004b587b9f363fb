//! Конфигурация отображения таблицы и вычисляемое представление для компонента таблицы.
use contracts::shared::paging::PageInfo;
use contracts::shared::transform::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// `true`/`false` или объект с параметрами (selection, index, pagination)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Enabled(bool),
    Options(Record),
}

impl Toggle {
    pub fn is_enabled(&self) -> bool {
        match self {
            Toggle::Enabled(enabled) => *enabled,
            Toggle::Options(_) => true,
        }
    }

    pub fn options(&self) -> Record {
        match self {
            Toggle::Enabled(_) => Record::new(),
            Toggle::Options(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Default,
    Selection,
    Index,
    Expand,
    Action,
}

/// Кнопка в колонке действий
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableButton {
    #[serde(default)]
    pub btn_text: Option<String>,
    /// Имя события, уходящего в `on_action`
    pub event: String,
    #[serde(default)]
    pub btn_type: Option<String>,
    #[serde(default, rename = "type")]
    pub style: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub props: Record,
}

/// Колонка таблицы
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    #[serde(default)]
    pub prop: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub width: Option<Value>,
    #[serde(default)]
    pub min_width: Option<Value>,
    #[serde(default)]
    pub fixed: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<ColumnKind>,
    #[serde(default)]
    pub slot_name: Option<String>,
    #[serde(default)]
    pub align: Option<String>,
    #[serde(default)]
    pub header_align: Option<String>,
    #[serde(default)]
    pub show_overflow_tooltip: Option<bool>,
    #[serde(default)]
    pub buttons: Vec<TableButton>,
    #[serde(default)]
    pub hidden: bool,
    /// Прочие свойства передаются компоненту как есть
    #[serde(flatten)]
    pub extra: Record,
}

impl TableColumn {
    pub fn new(prop: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prop: Some(prop.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// Обработчик пользовательского события строки: `(event, row, index)`
pub type ActionHandler<T> = Rc<dyn Fn(&str, &T, usize)>;

/// Конфигурация таблицы, которую задаёт вызывающий код
pub struct CustomTableConfig<T> {
    pub columns: Vec<TableColumn>,
    pub selection: Option<Toggle>,
    pub index: Option<Toggle>,
    /// Не задано - пагинация включена
    pub pagination: Option<Toggle>,
    pub on_custom_action: Option<ActionHandler<T>>,
    pub extra: Record,
}

impl<T> Default for CustomTableConfig<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            selection: None,
            index: None,
            pagination: None,
            on_custom_action: None,
            extra: Record::new(),
        }
    }
}

impl<T> Clone for CustomTableConfig<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            selection: self.selection.clone(),
            index: self.index.clone(),
            pagination: self.pagination.clone(),
            on_custom_action: self.on_custom_action.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Колонка номера строки со сквозной нумерацией по страницам
#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub options: Record,
    page: PageInfo,
}

impl IndexColumn {
    pub fn index(&self, local_index: usize) -> u64 {
        self.page.row_index(local_index)
    }
}

/// Параметры пагинации для компонента
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationView {
    pub total: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub options: Record,
}

impl PaginationView {
    /// Свойства компонента; явные параметры из конфигурации перекрывают вычисленные
    pub fn to_props(&self) -> Record {
        let mut props = Record::new();
        props.insert("total".to_string(), Value::from(self.total));
        props.insert("currentPage".to_string(), Value::from(self.current_page));
        props.insert("pageSize".to_string(), Value::from(self.page_size));
        props.extend(self.options.clone());
        props
    }
}

/// Готовая конфигурация для компонента таблицы
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<TableColumn>,
    pub selection: Option<Toggle>,
    pub index: Option<IndexColumn>,
    /// `None` - пагинация скрыта
    pub pagination: Option<PaginationView>,
    pub extra: Record,
}

impl TableView {
    /// Собирает представление: нумерация строк при включённом index,
    /// пагинация только если есть данные или ненулевой total и она не отключена.
    pub fn build<T>(
        config: &CustomTableConfig<T>,
        columns: Vec<TableColumn>,
        page: PageInfo,
        has_rows: bool,
    ) -> Self {
        let index = config
            .index
            .as_ref()
            .filter(|toggle| toggle.is_enabled())
            .map(|toggle| IndexColumn {
                options: toggle.options(),
                page,
            });

        let pagination_setting = config.pagination.clone().unwrap_or(Toggle::Enabled(true));
        let show_pagination = has_rows || page.total > 0;
        let pagination = (show_pagination && pagination_setting.is_enabled()).then(|| PaginationView {
            total: page.total,
            current_page: page.page_num,
            page_size: page.page_size,
            options: pagination_setting.options(),
        });

        Self {
            columns,
            selection: config.selection.clone(),
            index,
            pagination,
            extra: config.extra.clone(),
        }
    }
}
