//! Типы внешних API-функций, которые передаёт вызывающий код.
//!
//! Хуки ничего не знают о транспорте: каждая функция асинхронно возвращает
//! `ApiResult` с произвольным JSON-ответом (`msg` / `data` - по соглашению).

use contracts::shared::error::{ApiResult, CrudError};
use contracts::shared::transform::Record;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Будущий результат вызова API
pub type ApiFuture<T = Value> = Pin<Box<dyn Future<Output = ApiResult<T>>>>;

/// Будущий результат без значения (обработчики событий, колбэки)
pub type TaskFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Получение страницы списка по параметрам запроса
pub type ListApi = Rc<dyn Fn(Record) -> ApiFuture>;

/// API с одним JSON-аргументом: id для get/delete, тело для add/update
pub type ValueApi = Rc<dyn Fn(Value) -> ApiFuture>;

/// Пакетное удаление по списку id
pub type IdsApi = Rc<dyn Fn(Vec<Value>) -> ApiFuture>;

/// API без аргументов (удаление всех данных)
pub type UnitApi = Rc<dyn Fn() -> ApiFuture>;

/// Асинхронный колбэк без аргументов
pub type AsyncCallback = Rc<dyn Fn() -> TaskFuture>;

/// Запись, с которой работают хуки: строка таблицы или данные формы
pub trait CrudRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CrudRecord for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

pub fn list_api<F, Fut>(f: F) -> ListApi
where
    F: Fn(Record) -> Fut + 'static,
    Fut: Future<Output = ApiResult> + 'static,
{
    Rc::new(move |params: Record| -> ApiFuture { Box::pin(f(params)) })
}

pub fn value_api<F, Fut>(f: F) -> ValueApi
where
    F: Fn(Value) -> Fut + 'static,
    Fut: Future<Output = ApiResult> + 'static,
{
    Rc::new(move |value: Value| -> ApiFuture { Box::pin(f(value)) })
}

pub fn ids_api<F, Fut>(f: F) -> IdsApi
where
    F: Fn(Vec<Value>) -> Fut + 'static,
    Fut: Future<Output = ApiResult> + 'static,
{
    Rc::new(move |ids: Vec<Value>| -> ApiFuture { Box::pin(f(ids)) })
}

pub fn unit_api<F, Fut>(f: F) -> UnitApi
where
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = ApiResult> + 'static,
{
    Rc::new(move || -> ApiFuture { Box::pin(f()) })
}

pub fn async_callback<F, Fut>(f: F) -> AsyncCallback
where
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    Rc::new(move || -> TaskFuture { Box::pin(f()) })
}

/// Заглушка для ненастроенного API: всегда отклоняется ошибкой конфигурации
pub(crate) fn not_configured(name: &str) -> ApiFuture {
    let err = CrudError::configuration(format!("{} не настроен", name));
    Box::pin(async move { Err(err) })
}

/// Значение поля записи по ключу (`null`, если поля нет)
pub fn field_of<T: Serialize>(record: &T, key: &str) -> Value {
    serde_json::to_value(record)
        .ok()
        .and_then(|value| value.get(key).cloned())
        .unwrap_or(Value::Null)
}
