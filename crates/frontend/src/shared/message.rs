//! Сообщения пользователю: success / error / warning / confirm.
//!
//! Каждый канал можно переопределить через `MessageApi`; если переопределения нет,
//! используется платформенное отображение (`NoticeService` из контекста, `window.confirm`).

use contracts::shared::error::CrudError;
use leptos::logging::{error, log};
use leptos::prelude::*;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Тип уведомления
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Уведомление в очереди `NoticeService`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

/// Сколько уведомлений держится в очереди одновременно; старые вытесняются
pub const MAX_NOTICES: usize = 5;

/// Через сколько миллисекунд уведомление скрывается само (только в браузере)
pub const NOTICE_TIMEOUT_MS: u32 = 3000;

/// Реактивная очередь уведомлений, кладётся в контекст приложения
#[derive(Clone, Copy)]
pub struct NoticeService {
    notices: RwSignal<Vec<Notice>>,
    next_id: RwSignal<u64>,
}

impl NoticeService {
    pub fn new() -> Self {
        Self {
            notices: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(1),
        }
    }

    pub fn push(&self, kind: NoticeKind, text: impl Into<String>) -> u64 {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        self.notices.update(|list| {
            list.push(Notice {
                id,
                kind,
                text: text.into(),
            });
            if list.len() > MAX_NOTICES {
                let overflow = list.len() - MAX_NOTICES;
                list.drain(..overflow);
            }
        });
        self.schedule_dismiss(id);
        id
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_dismiss(&self, id: u64) {
        let svc = *self;
        gloo_timers::callback::Timeout::new(NOTICE_TIMEOUT_MS, move || svc.dismiss(id)).forget();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_dismiss(&self, _id: u64) {}

    pub fn dismiss(&self, id: u64) {
        self.notices.update(|list| list.retain(|n| n.id != id));
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.get()
    }
}

impl Default for NoticeService {
    fn default() -> Self {
        Self::new()
    }
}

/// Кладёт `NoticeService` в контекст и возвращает его
pub fn provide_notice_service() -> NoticeService {
    let svc = NoticeService::new();
    provide_context(svc);
    svc
}

/// Параметры окна подтверждения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub confirm_button_text: String,
    pub cancel_button_text: String,
    pub kind: NoticeKind,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            confirm_button_text: "Да".to_string(),
            cancel_button_text: "Отмена".to_string(),
            kind: NoticeKind::Warning,
        }
    }
}

/// Запрос подтверждения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub message: String,
    pub title: String,
    pub options: ConfirmOptions,
}

/// `true` - пользователь подтвердил, `false` - отменил
pub type ConfirmFuture = Pin<Box<dyn Future<Output = bool>>>;

pub type NotifyFn = Rc<dyn Fn(&str)>;
pub type ConfirmFn = Rc<dyn Fn(ConfirmRequest) -> ConfirmFuture>;

/// Частичное переопределение каналов сообщений
#[derive(Clone, Default)]
pub struct MessageApi {
    pub success: Option<NotifyFn>,
    pub error: Option<NotifyFn>,
    pub warning: Option<NotifyFn>,
    pub confirm: Option<ConfirmFn>,
}

impl MessageApi {
    pub fn with_success(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.success = Some(Rc::new(f));
        self
    }

    pub fn with_error(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.error = Some(Rc::new(f));
        self
    }

    pub fn with_warning(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.warning = Some(Rc::new(f));
        self
    }

    pub fn with_confirm<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ConfirmRequest) -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        self.confirm = Some(Rc::new(move |req: ConfirmRequest| -> ConfirmFuture { Box::pin(f(req)) }));
        self
    }
}

const DEFAULT_CONFIRM_TITLE: &str = "Подтверждение";

/// Разрешает каждый вызов: переопределение вызывающего кода, иначе платформенный канал
#[derive(Clone)]
pub struct Messenger {
    custom: MessageApi,
    notices: Option<NoticeService>,
}

impl Messenger {
    pub fn new(custom: MessageApi) -> Self {
        Self {
            custom,
            notices: use_context::<NoticeService>(),
        }
    }

    pub fn success(&self, msg: &str) {
        match &self.custom.success {
            Some(f) => f(msg),
            None => self.notice(NoticeKind::Success, msg),
        }
    }

    pub fn error(&self, msg: &str) {
        match &self.custom.error {
            Some(f) => f(msg),
            None => match self.notices {
                Some(svc) => {
                    svc.push(NoticeKind::Error, msg);
                }
                None => error!("{}", msg),
            },
        }
    }

    pub fn warning(&self, msg: &str) {
        match &self.custom.warning {
            Some(f) => f(msg),
            None => self.notice(NoticeKind::Warning, msg),
        }
    }

    /// Ждёт ответа пользователя; отмена возвращается как `CrudError::cancelled()`
    pub async fn confirm(
        &self,
        msg: &str,
        title: Option<&str>,
        options: Option<ConfirmOptions>,
    ) -> Result<(), CrudError> {
        let request = ConfirmRequest {
            message: msg.to_string(),
            title: title.unwrap_or(DEFAULT_CONFIRM_TITLE).to_string(),
            options: options.unwrap_or_default(),
        };
        let confirmed = match &self.custom.confirm {
            Some(f) => f(request).await,
            None => platform_confirm(&request),
        };
        if confirmed {
            Ok(())
        } else {
            Err(CrudError::cancelled())
        }
    }

    fn notice(&self, kind: NoticeKind, msg: &str) {
        match self.notices {
            Some(svc) => {
                svc.push(kind, msg);
            }
            None => log!("[{:?}] {}", kind, msg),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn platform_confirm(request: &ConfirmRequest) -> bool {
    web_sys::window()
        .and_then(|win| {
            win.confirm_with_message(&format!("{}\n\n{}", request.title, request.message))
                .ok()
        })
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_confirm(request: &ConfirmRequest) -> bool {
    leptos::logging::warn!("Нет окна для подтверждения, считаем отменой: {}", request.message);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_custom_channels_take_priority() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let api = MessageApi::default()
            .with_success({
                let seen = seen.clone();
                move |m| seen.borrow_mut().push(format!("ok:{}", m))
            })
            .with_warning({
                let seen = seen.clone();
                move |m| seen.borrow_mut().push(format!("warn:{}", m))
            });
        let messenger = Messenger::new(api);
        messenger.success("a");
        messenger.warning("b");
        // error без переопределения уходит в лог
        messenger.error("c");
        assert_eq!(*seen.borrow(), vec!["ok:a".to_string(), "warn:b".to_string()]);
    }

    #[test]
    fn test_notice_service_queue() {
        let svc = NoticeService::new();
        let first = svc.push(NoticeKind::Success, "saved");
        svc.push(NoticeKind::Warning, "careful");
        svc.dismiss(first);
        let left = svc.notices();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "careful");
        assert_eq!(left[0].kind, NoticeKind::Warning);
    }

    #[test]
    fn test_notice_service_keeps_newest() {
        let svc = NoticeService::new();
        for i in 0..MAX_NOTICES + 2 {
            svc.push(NoticeKind::Success, format!("n{}", i));
        }
        let texts: Vec<String> = svc.notices().into_iter().map(|n| n.text).collect();
        assert_eq!(texts.len(), MAX_NOTICES);
        assert_eq!(texts.first().map(String::as_str), Some("n2"));
        assert_eq!(texts.last().map(String::as_str), Some(format!("n{}", MAX_NOTICES + 1).as_str()));
    }

    #[test]
    fn test_default_channels_use_notice_service() {
        let svc = NoticeService::new();
        let messenger = Messenger {
            custom: MessageApi::default(),
            notices: Some(svc),
        };
        messenger.success("done");
        messenger.error("failed");
        let kinds: Vec<NoticeKind> = svc.notices().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::Success, NoticeKind::Error]);
    }

    #[tokio::test]
    async fn test_confirm_resolution() {
        let titles = Rc::new(RefCell::new(Vec::new()));
        let api = MessageApi::default().with_confirm({
            let titles = titles.clone();
            move |req: ConfirmRequest| {
                titles.borrow_mut().push(req.title.clone());
                let answer = req.message == "yes";
                async move { answer }
            }
        });
        let messenger = Messenger::new(api);
        assert!(messenger.confirm("yes", None, None).await.is_ok());
        assert!(messenger.confirm("no", Some("Удаление"), None).await.unwrap_err().is_cancelled());
        assert_eq!(*titles.borrow(), vec!["Подтверждение".to_string(), "Удаление".to_string()]);

        // без переопределения и без окна - отмена
        let fallback = Messenger::new(MessageApi::default());
        assert!(fallback.confirm("anything", None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_confirm_passes_options() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let api = MessageApi::default().with_confirm({
            let seen = seen.clone();
            move |req: ConfirmRequest| {
                seen.borrow_mut().push(req.options.clone());
                async move { true }
            }
        });
        let messenger = Messenger::new(api);
        let options = ConfirmOptions {
            confirm_button_text: "Удалить".to_string(),
            kind: NoticeKind::Error,
            ..ConfirmOptions::default()
        };
        assert!(messenger.confirm("delete?", None, Some(options)).await.is_ok());
        assert!(messenger.confirm("again?", None, None).await.is_ok());

        let seen = seen.borrow();
        assert_eq!(seen[0].confirm_button_text, "Удалить");
        assert_eq!(seen[0].cancel_button_text, "Отмена");
        assert_eq!(seen[0].kind, NoticeKind::Error);
        assert_eq!(seen[1].confirm_button_text, "Да");
    }
}
