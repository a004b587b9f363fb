use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transform::Record;

/// Размер страницы по умолчанию
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Ключи, под которыми списочные API обычно отдают строки (порядок = приоритет)
pub const DATA_KEY_CANDIDATES: [&str; 5] = ["rows", "data", "list", "records", "items"];

/// Ключи, под которыми списочные API обычно отдают общее количество (порядок = приоритет)
pub const TOTAL_KEY_CANDIDATES: [&str; 4] = ["total", "totalCount", "count", "totalElements"];

/// Состояние пагинации таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Текущая страница (с 1)
    pub page_num: u64,
    /// Строк на странице (>= 1)
    pub page_size: u64,
    /// Общее количество строк на сервере
    pub total: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl PageInfo {
    /// Поля пагинации для запроса: `{ pageNum, pageSize }`
    pub fn to_query(&self) -> Record {
        let mut query = Record::new();
        query.insert("pageNum".to_string(), Value::from(self.page_num));
        query.insert("pageSize".to_string(), Value::from(self.page_size));
        query
    }

    /// Сквозной номер строки с учётом страницы (1-based)
    pub fn row_index(&self, local_index: usize) -> u64 {
        (self.page_num.max(1) - 1) * self.page_size + local_index as u64 + 1
    }

    /// Переход на предыдущую страницу, но не ниже первой
    pub fn step_back(&mut self) {
        if self.page_num > 1 {
            self.page_num -= 1;
        }
    }
}

/// Событие смены страницы от компонента пагинации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationChange {
    pub page: u64,
    pub limit: u64,
}

/// Как извлекать строки и количество из ответа списочного API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResultKeys {
    pub data_key: String,
    pub total_key: String,
    /// Перебирать известные имена ключей перед явно заданными
    pub auto_detect: bool,
}

impl Default for ListResultKeys {
    fn default() -> Self {
        Self {
            data_key: "rows".to_string(),
            total_key: "total".to_string(),
            auto_detect: true,
        }
    }
}

/// Разобранный ответ списочного API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedList {
    pub rows: Vec<Value>,
    pub total: u64,
}

/// Извлекает строки и общее количество из ответа.
///
/// В режиме автоопределения ключи-кандидаты перебираются по порядку, побеждает первое
/// совпадение: для строк - первый массив, для количества - первое число.
/// Если ничего не найдено, используются `data_key` / `total_key`.
pub fn parse_list_result(result: &Value, keys: &ListResultKeys) -> ParsedList {
    if !keys.auto_detect {
        return ParsedList {
            rows: rows_at(result, &keys.data_key).unwrap_or_default(),
            total: total_at(result, &keys.total_key).unwrap_or(0),
        };
    }

    let mut rows = DATA_KEY_CANDIDATES
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array).cloned())
        .unwrap_or_default();
    let mut total = TOTAL_KEY_CANDIDATES
        .iter()
        .find_map(|key| result.get(*key).filter(|v| v.is_number()).and_then(number_to_total))
        .unwrap_or(0);

    if rows.is_empty() {
        if let Some(configured) = rows_at(result, &keys.data_key) {
            rows = configured;
        }
    }
    if total == 0 {
        if let Some(configured) = total_at(result, &keys.total_key) {
            total = configured;
        }
    }

    ParsedList { rows, total }
}

fn rows_at(result: &Value, key: &str) -> Option<Vec<Value>> {
    result.get(key).and_then(Value::as_array).cloned()
}

fn total_at(result: &Value, key: &str) -> Option<u64> {
    match result.get(key)? {
        Value::String(s) => s.trim().parse::<f64>().ok().map(|n| n.max(0.0) as u64),
        other => number_to_total(other),
    }
}

fn number_to_total(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|n| n.max(0.0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auto_detect_rows_and_total() {
        let parsed = parse_list_result(
            &json!({"rows": [{"id": 1}, {"id": 2}], "total": 5, "extra": 1}),
            &ListResultKeys::default(),
        );
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.total, 5);
    }

    #[test]
    fn test_auto_detect_alternative_keys() {
        let parsed = parse_list_result(
            &json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}], "count": 3}),
            &ListResultKeys::default(),
        );
        assert_eq!(parsed.rows, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
        assert_eq!(parsed.total, 3);
    }

    #[test]
    fn test_auto_detect_first_match_wins() {
        let parsed = parse_list_result(
            &json!({"items": [{"id": "i"}], "list": [{"id": "l"}], "count": 7, "totalCount": 9}),
            &ListResultKeys::default(),
        );
        assert_eq!(parsed.rows, vec![json!({"id": "l"})]);
        assert_eq!(parsed.total, 9);
    }

    #[test]
    fn test_auto_detect_skips_non_matching_types() {
        // `data` - не массив, `total` - не число
        let parsed = parse_list_result(
            &json!({"data": {"nested": true}, "records": [1], "total": "12", "count": 4}),
            &ListResultKeys::default(),
        );
        assert_eq!(parsed.rows, vec![json!(1)]);
        assert_eq!(parsed.total, 4);
    }

    #[test]
    fn test_auto_detect_falls_back_to_configured_keys() {
        let keys = ListResultKeys {
            data_key: "content".to_string(),
            total_key: "size".to_string(),
            auto_detect: true,
        };
        let parsed = parse_list_result(&json!({"content": [1, 2], "size": 2}), &keys);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.total, 2);
    }

    #[test]
    fn test_explicit_mode_uses_configured_keys_only() {
        let keys = ListResultKeys {
            data_key: "payload".to_string(),
            total_key: "amount".to_string(),
            auto_detect: false,
        };
        let parsed = parse_list_result(&json!({"rows": [1], "total": 1, "payload": [1, 2], "amount": 8}), &keys);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.total, 8);

        let empty = parse_list_result(&json!({"rows": [1], "total": 1}), &keys);
        assert_eq!(empty, ParsedList::default());
    }

    #[test]
    fn test_row_index_and_step_back() {
        let mut page = PageInfo {
            page_num: 3,
            page_size: 20,
            total: 41,
        };
        assert_eq!(page.row_index(0), 41);
        page.step_back();
        assert_eq!(page.page_num, 2);
        page.page_num = 1;
        page.step_back();
        assert_eq!(page.page_num, 1);
    }

    #[test]
    fn test_to_query() {
        let query = PageInfo::default().to_query();
        assert_eq!(Value::Object(query), json!({"pageNum": 1, "pageSize": 10}));
    }
}
