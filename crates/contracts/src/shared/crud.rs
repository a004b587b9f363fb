use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transform::{array_to_string, process_time_range, Record, TimeRangeKeys, DEFAULT_SEPARATOR};

/// Режим диалога формы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogMode {
    #[default]
    Add,
    Edit,
}

impl DialogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogMode::Add => "add",
            DialogMode::Edit => "edit",
        }
    }
}

/// Поле-диапазон дат в параметрах поиска
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeField {
    pub field: String,
    #[serde(default)]
    pub prefix: Option<TimeRangeKeys>,
}

impl TimeField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: None,
        }
    }

    pub fn with_keys(mut self, keys: TimeRangeKeys) -> Self {
        self.prefix = Some(keys);
        self
    }
}

/// Подготовка параметров запроса: сначала диапазоны дат, затем склейка массивов
pub fn shape_query(params: &Record, time_fields: &[TimeField], array_fields: &[String]) -> Record {
    let mut shaped = params.clone();
    for time_field in time_fields {
        shaped = process_time_range(&shaped, &time_field.field, time_field.prefix.as_ref());
    }
    if !array_fields.is_empty() {
        shaped = array_to_string(&shaped, array_fields, DEFAULT_SEPARATOR);
    }
    shaped
}

/// Сообщение из ответа API (`msg`), если оно непустое
pub fn response_message(response: &Value) -> Option<String> {
    response
        .get("msg")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Полезная нагрузка ответа (`data`); `null`, если её нет
pub fn response_data(response: &Value) -> Value {
    response.get("data").cloned().unwrap_or(Value::Null)
}
