use super::*;
use crate::hooks::test_support::{CallLog, MessageLog};
use crate::shared::api::{async_callback, value_api, ValueApi};
use contracts::shared::error::CrudError;
use contracts::shared::transform::{array_to_string, string_to_array, DEFAULT_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

fn recording_api(calls: &CallLog<Value>, response: Value) -> ValueApi {
    let log = calls.clone();
    value_api(move |body: Value| {
        log.record(body);
        let response = response.clone();
        async move { Ok(response) }
    })
}

fn join_tags() -> BeforeSubmit {
    Rc::new(|data: Value| {
        let record = data.as_object()?;
        Some(Value::Object(array_to_string(record, &["tags"], DEFAULT_SEPARATOR)))
    })
}

fn split_tags() -> AfterGet {
    Rc::new(|data: Value| match data.as_object() {
        Some(record) => Value::Object(string_to_array(record, &["tags"], DEFAULT_SEPARATOR)),
        None => data,
    })
}

struct Fixture {
    dialog: FormDialog<Article>,
    adds: CallLog<Value>,
    updates: CallLog<Value>,
    messages: MessageLog,
}

fn fixture(configure: impl FnOnce(&mut FormDialogConfig<Article>)) -> Fixture {
    let adds = CallLog::default();
    let updates = CallLog::default();
    let messages = MessageLog::default();
    let mut config = FormDialogConfig::new(
        Article::default(),
        recording_api(&adds, json!({"msg": "Добавлено"})),
        recording_api(&updates, json!({})),
    );
    config.message_api = messages.api();
    configure(&mut config);
    Fixture {
        dialog: FormDialog::new(config),
        adds,
        updates,
        messages,
    }
}

#[tokio::test]
async fn test_add_submit_joins_tags_and_resets() {
    let refetches = Rc::new(Cell::new(0));
    let counter = refetches.clone();
    let f = fixture(move |config| {
        config.data_transform.before_submit = Some(join_tags());
        config.on_success = Some(async_callback(move || {
            counter.set(counter.get() + 1);
            async {}
        }));
    });

    f.dialog.open_dialog(DialogMode::Add, None).await;
    assert!(f.dialog.dialog_visible.get_untracked());
    f.dialog.form_data.update(|form| form.tags = vec!["a".to_string(), "b".to_string()]);
    f.dialog.submit_form().await;

    assert_eq!(f.adds.calls(), vec![json!({"name": "", "tags": "a,b"})]);
    assert_eq!(f.updates.count(), 0);
    assert_eq!(f.messages.successes(), vec!["Добавлено".to_string()]);
    assert!(!f.dialog.dialog_visible.get_untracked());
    assert_eq!(f.dialog.form_data.get_untracked(), Article::default());
    assert!(!f.dialog.submit_loading.get_untracked());
    assert_eq!(refetches.get(), 1);
}

#[tokio::test]
async fn test_reset_does_not_touch_template() {
    let f = fixture(|_| {});
    f.dialog.form_data.update(|form| form.name = "draft".to_string());
    f.dialog.reset_form();
    assert_eq!(f.dialog.form_data.get_untracked().name, "");

    f.dialog.form_data.update(|form| form.tags.push("x".to_string()));
    f.dialog.handle_dialog_close();
    assert!(f.dialog.form_data.get_untracked().tags.is_empty());
}

#[tokio::test]
async fn test_edit_loads_record_through_after_get() {
    let requested = CallLog::default();
    let log = requested.clone();
    let f = fixture(move |config| {
        config.get_api = Some(value_api(move |id: Value| {
            log.record(id);
            async move { Ok(json!({"data": {"id": 7, "tags": "a,b"}})) }
        }));
        config.data_transform.after_get = Some(split_tags());
    });

    f.dialog.open_dialog(DialogMode::Edit, Some(json!({"id": 7, "name": "old"}))).await;

    assert_eq!(requested.calls(), vec![json!(7)]);
    let form = f.dialog.form_data.get_untracked();
    assert_eq!(form.id, Some(7));
    assert_eq!(form.tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(f.dialog.dialog_mode.get_untracked(), DialogMode::Edit);
    assert!(!f.dialog.form_loading.get_untracked());
}

#[tokio::test]
async fn test_edit_uses_bare_id() {
    let requested = CallLog::default();
    let log = requested.clone();
    let f = fixture(move |config| {
        config.get_api = Some(value_api(move |id: Value| {
            log.record(id);
            async move { Ok(json!({"data": {"id": 3}})) }
        }));
    });
    f.dialog.open_dialog(DialogMode::Edit, Some(json!(3))).await;
    f.dialog.open_dialog(DialogMode::Edit, Some(json!({"name": "no id"}))).await;
    assert_eq!(requested.calls(), vec![json!(3), json!({"name": "no id"})]);
}

#[tokio::test]
async fn test_edit_load_failure_keeps_dialog_open() {
    let f = fixture(|config| {
        config.get_api = Some(value_api(|_id: Value| async move { Err::<Value, _>(CrudError::api("not found")) }));
    });
    f.dialog.open_dialog(DialogMode::Edit, Some(json!({"id": 1}))).await;
    assert!(f.dialog.dialog_visible.get_untracked());
    assert!(!f.dialog.form_loading.get_untracked());
    assert_eq!(f.messages.errors(), vec!["Не удалось получить данные: not found".to_string()]);
    assert_eq!(f.dialog.form_data.get_untracked(), Article::default());
}

#[tokio::test]
async fn test_edit_without_get_api_takes_row() {
    let f = fixture(|config| {
        config.data_transform.after_get = Some(split_tags());
    });
    f.dialog
        .open_dialog(DialogMode::Edit, Some(json!({"id": 4, "name": "row", "tags": "x,y"})))
        .await;
    let form = f.dialog.form_data.get_untracked();
    assert_eq!(form.name, "row");
    assert_eq!(form.tags, vec!["x".to_string(), "y".to_string()]);

    f.dialog.submit_form().await;
    assert_eq!(f.updates.count(), 1);
    assert_eq!(f.adds.count(), 0);
    assert_eq!(f.messages.successes(), vec!["Операция выполнена успешно".to_string()]);
}

#[tokio::test]
async fn test_invalid_form_is_not_submitted() {
    let f = fixture(|config| {
        config.form_rules = FormRules::new()
            .required("name", "Введите название")
            .rule("name", |form: &Article| {
                if form.name.len() > 5 {
                    Err("Слишком длинное".to_string())
                } else {
                    Ok(())
                }
            });
    });
    f.dialog.open_dialog(DialogMode::Add, None).await;
    f.dialog.submit_form().await;

    assert_eq!(f.adds.count(), 0);
    assert!(f.messages.errors().is_empty());
    assert!(f.dialog.dialog_visible.get_untracked());
    assert_eq!(f.dialog.field_error("name").as_deref(), Some("Введите название"));

    f.dialog.form_data.update(|form| form.name = "ok".to_string());
    f.dialog.submit_form().await;
    assert_eq!(f.adds.count(), 1);
    assert!(f.dialog.validation_errors.get_untracked().is_empty());
}

#[tokio::test]
async fn test_before_submit_can_cancel() {
    let f = fixture(|config| {
        config.data_transform.before_submit = Some(Rc::new(|_data: Value| None));
    });
    f.dialog.open_dialog(DialogMode::Add, None).await;
    f.dialog.submit_form().await;
    assert_eq!(f.adds.count(), 0);
    assert!(!f.dialog.submit_loading.get_untracked());
    assert!(f.dialog.dialog_visible.get_untracked());

    let f = fixture(|config| {
        config.data_transform.before_submit = Some(Rc::new(|_data: Value| Some(Value::Null)));
    });
    f.dialog.submit_form().await;
    assert_eq!(f.adds.count(), 0);
}

#[tokio::test]
async fn test_submit_failure_keeps_dialog_open() {
    let f = fixture(|config| {
        config.add_api = value_api(|_body: Value| async move { Err::<Value, _>(CrudError::api("duplicate")) });
    });
    f.dialog.open_dialog(DialogMode::Add, None).await;
    f.dialog.form_data.update(|form| form.name = "x".to_string());
    f.dialog.submit_form().await;

    assert_eq!(f.messages.errors(), vec!["Не удалось сохранить: duplicate".to_string()]);
    assert!(f.messages.successes().is_empty());
    assert!(f.dialog.dialog_visible.get_untracked());
    assert_eq!(f.dialog.form_data.get_untracked().name, "x");
    assert!(!f.dialog.submit_loading.get_untracked());
}

#[tokio::test]
async fn test_submit_success_callback_failure_still_closes() {
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let f = fixture(move |config| {
        config.on_submit_success = Some(Rc::new(move |response: Value, mode: DialogMode, form: Article| -> SubmitSuccessFuture {
            *sink.borrow_mut() = Some((response, mode, form.name));
            Box::pin(async { Err::<(), _>(CrudError::api("callback failed")) })
        }));
    });
    f.dialog.open_dialog(DialogMode::Add, None).await;
    f.dialog.form_data.update(|form| form.name = "new".to_string());
    f.dialog.submit_form().await;

    assert_eq!(
        *seen.borrow(),
        Some((json!({"msg": "Добавлено"}), DialogMode::Add, "new".to_string()))
    );
    assert!(!f.dialog.dialog_visible.get_untracked());
}

#[test]
fn test_rules_keep_first_error_per_field() {
    let rules = FormRules::<Article>::new()
        .required("name", "Введите название")
        .rule("name", |_| Err("второе".to_string()))
        .required("tags", "Нужен тег");
    let errors = rules.validate(&Article::default());
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["name"], "Введите название");
    assert_eq!(errors["tags"], "Нужен тег");

    let filled = Article {
        id: None,
        name: "  ".to_string(),
        tags: vec!["t".to_string()],
    };
    let errors = rules.validate(&filled);
    assert_eq!(errors.get("name").map(String::as_str), Some("Введите название"));
    assert!(!errors.contains_key("tags"));
}
