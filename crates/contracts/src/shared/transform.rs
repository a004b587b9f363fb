//! Преобразования формы полей записи (массив <-> строка, диапазоны дат, очистка пустых значений).
//!
//! Все функции работают с поверхностной копией записи и никогда не изменяют аргумент,
//! кроме `add_date_range`, которая по контракту дописывает диапазон в переданный запрос.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Разделитель по умолчанию для склейки/разбиения массивов
pub const DEFAULT_SEPARATOR: &str = ",";

/// Запись: строковый ключ -> значение
pub type Record = Map<String, Value>;

/// Имена ключей, в которые раскладывается диапазон `[начало, конец]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeRangeKeys {
    /// `{ start, end }` - имена используются как есть
    Explicit { start: String, end: String },
    /// `S` превращается в `beginS` / `endS`
    Prefix(String),
}

impl TimeRangeKeys {
    pub fn explicit(start: impl Into<String>, end: impl Into<String>) -> Self {
        TimeRangeKeys::Explicit {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        TimeRangeKeys::Prefix(prefix.into())
    }

    /// Пара ключей (начало, конец); без конфигурации префиксом служит `fallback`
    pub fn resolve(keys: Option<&TimeRangeKeys>, fallback: &str) -> (String, String) {
        match keys {
            Some(TimeRangeKeys::Explicit { start, end }) => (start.clone(), end.clone()),
            Some(TimeRangeKeys::Prefix(prefix)) => (format!("begin{}", prefix), format!("end{}", prefix)),
            None => (format!("begin{}", fallback), format!("end{}", fallback)),
        }
    }
}

/// Склеивает массивные поля в строку через `separator`.
/// Отсутствующие поля и поля-не-массивы не трогаются.
pub fn array_to_string<S: AsRef<str>>(data: &Record, fields: &[S], separator: &str) -> Record {
    let mut result = data.clone();
    for field in fields {
        if let Some(Value::Array(items)) = result.get(field.as_ref()) {
            let joined = items.iter().map(join_item).collect::<Vec<_>>().join(separator);
            result.insert(field.as_ref().to_string(), Value::String(joined));
        }
    }
    result
}

fn join_item(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_item).collect::<Vec<_>>().join(DEFAULT_SEPARATOR),
        other => other.to_string(),
    }
}

/// Разбивает строковые поля в массив (для отображения при редактировании).
/// Массив остаётся как есть, пустые/отсутствующие значения становятся `[]`.
pub fn string_to_array<S: AsRef<str>>(data: &Record, fields: &[S], separator: &str) -> Record {
    let mut result = data.clone();
    for field in fields {
        let converted = match result.get(field.as_ref()) {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            Some(Value::String(s)) if !s.is_empty() => Value::Array(
                s.split(separator)
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ),
            _ => Value::Array(Vec::new()),
        };
        result.insert(field.as_ref().to_string(), converted);
    }
    result
}

/// Раскладывает двухэлементный диапазон `params[field]` на два ключа и удаляет исходное поле.
/// Для любого другого значения возвращает неизменённую копию.
pub fn process_time_range(params: &Record, field: &str, keys: Option<&TimeRangeKeys>) -> Record {
    let mut processed = params.clone();
    let bounds = match processed.get(field) {
        Some(Value::Array(items)) if items.len() == 2 => (items[0].clone(), items[1].clone()),
        _ => return processed,
    };

    let (start_key, end_key) = TimeRangeKeys::resolve(keys, field);
    processed.remove(field);
    processed.insert(start_key, bounds.0);
    processed.insert(end_key, bounds.1);
    processed
}

/// Удаляет поля со значением `""` или `null`: из списка `fields` или из всех ключей
pub fn clean_empty_fields<S: AsRef<str>>(data: &Record, fields: Option<&[S]>) -> Record {
    let mut result = data.clone();
    let targets: Vec<String> = match fields {
        Some(fields) => fields.iter().map(|f| f.as_ref().to_string()).collect(),
        None => result.keys().cloned().collect(),
    };
    for field in targets {
        if matches!(result.get(&field), Some(Value::Null)) || is_empty_string(result.get(&field)) {
            result.remove(&field);
        }
    }
    result
}

fn is_empty_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s.is_empty())
}

/// Приводит поля к числу; отсутствующие поля и `""` пропускаются.
/// Нечисловые значения становятся `null`.
pub fn convert_numbers<S: AsRef<str>>(data: &Record, fields: &[S]) -> Record {
    let mut result = data.clone();
    for field in fields {
        let converted = match result.get(field.as_ref()) {
            None => continue,
            Some(value) if is_empty_string(Some(value)) => continue,
            Some(value) => to_number(value),
        };
        result.insert(field.as_ref().to_string(), converted);
    }
    result
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n.clone()),
        Value::Bool(b) => Value::from(if *b { 1 } else { 0 }),
        Value::Null => Value::from(0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Value::from(0);
            }
            match trimmed.parse::<f64>() {
                Ok(n) => number_value(n),
                Err(_) => Value::Null,
            }
        }
        Value::Array(_) | Value::Object(_) => Value::Null,
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Рекурсивная очистка: пустая строка -> `null`, запись без ключей -> `null`,
/// `null`-элементы массивов отбрасываются.
pub fn deep_clean_empty_fields(data: &Value) -> Value {
    match data {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(deep_clean_empty_fields)
                .filter(|item| !item.is_null())
                .collect(),
        ),
        Value::Object(map) => {
            let cleaned: Record = map
                .iter()
                .filter_map(|(key, value)| {
                    let value = deep_clean_empty_fields(value);
                    (!value.is_null()).then(|| (key.clone(), value))
                })
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        Value::String(s) if s.is_empty() => Value::Null,
        other => other.clone(),
    }
}

/// Дописывает диапазон дат во вложенную запись `params` запроса.
/// Ключи по умолчанию - `beginTime` / `endTime`.
pub fn add_date_range<'a>(
    query: &'a mut Record,
    range: &[Value],
    keys: Option<&TimeRangeKeys>,
) -> &'a mut Record {
    if !matches!(query.get("params"), Some(Value::Object(_))) {
        query.insert("params".to_string(), Value::Object(Record::new()));
    }
    let (start_key, end_key) = TimeRangeKeys::resolve(keys, "Time");

    if let Some(Value::Object(nested)) = query.get_mut("params") {
        if let Some(start) = range.first() {
            nested.insert(start_key, start.clone());
        }
        if let Some(end) = range.get(1) {
            nested.insert(end_key, end.clone());
        }
    }
    query
}
