//! Экспорт табличных данных: функция-коллаборатор и её браузерная реализация по умолчанию

use contracts::shared::transform::Record;
use std::rc::Rc;

/// `(url, params, filename)` - запускает скачивание, результат не ждём
pub type ExportFunction = Rc<dyn Fn(&str, Record, String)>;

/// Расширение файла выгрузки
pub const EXPORT_EXTENSION: &str = "xlsx";

/// Имя файла выгрузки с меткой времени: `{base}_{millis}.xlsx`
pub fn export_filename(base: &str, timestamp_millis: i64) -> String {
    format!("{}_{}.{}", base, timestamp_millis, EXPORT_EXTENSION)
}

/// URL выгрузки с параметрами в query string
pub fn export_url(url: &str, params: &Record) -> Result<String, String> {
    let query = serde_qs::to_string(params).map_err(|e| format!("Failed to encode export params: {}", e))?;
    if query.is_empty() {
        return Ok(url.to_string());
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", url, separator, query))
}

/// Экспорт через скрытую ссылку: браузер скачивает файл по GET-запросу
pub fn browser_export(url: &str, params: Record, filename: String) {
    let href = match export_url(url, &params) {
        Ok(href) => href,
        Err(e) => {
            leptos::logging::error!("{}", e);
            return;
        }
    };
    if let Err(e) = download_url(&href, &filename) {
        leptos::logging::error!("Ошибка экспорта: {}", e);
    }
}

/// Обёртка над `browser_export` в виде `ExportFunction`
pub fn browser_export_function() -> ExportFunction {
    Rc::new(|url: &str, params: Record, filename: String| browser_export(url, params, filename))
}

#[cfg(target_arch = "wasm32")]
fn download_url(href: &str, filename: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;
    use web_sys::HtmlAnchorElement;

    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    // Создаем временную ссылку для скачивания
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(href);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn download_url(href: &str, filename: &str) -> Result<(), String> {
    Err(format!("Скачивание доступно только в браузере: {} -> {}", href, filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("users", 1700000000000), "users_1700000000000.xlsx");
    }

    #[test]
    fn test_export_url() {
        let params = json!({"status": "active", "page": 2});
        let href = export_url("/api/users/export", params.as_object().unwrap()).unwrap();
        assert!(href.starts_with("/api/users/export?"));
        assert!(href.contains("status=active"));
        assert!(href.contains("page=2"));

        let with_query = export_url("/export?v=1", params.as_object().unwrap()).unwrap();
        assert!(with_query.starts_with("/export?v=1&"));

        assert_eq!(export_url("/export", &Record::new()).unwrap(), "/export");
    }
}
