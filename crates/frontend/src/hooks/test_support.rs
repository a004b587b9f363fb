use crate::shared::message::{ConfirmRequest, MessageApi};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Записывает все сообщения и отвечает на подтверждения заданным образом
#[derive(Clone, Default)]
pub(crate) struct MessageLog {
    pub success: Rc<RefCell<Vec<String>>>,
    pub error: Rc<RefCell<Vec<String>>>,
    pub warning: Rc<RefCell<Vec<String>>>,
    pub confirms: Rc<RefCell<Vec<String>>>,
    pub decline: Rc<Cell<bool>>,
}

impl MessageLog {
    pub fn api(&self) -> MessageApi {
        let success = self.success.clone();
        let error = self.error.clone();
        let warning = self.warning.clone();
        let confirms = self.confirms.clone();
        let decline = self.decline.clone();
        MessageApi::default()
            .with_success(move |m| success.borrow_mut().push(m.to_string()))
            .with_error(move |m| error.borrow_mut().push(m.to_string()))
            .with_warning(move |m| warning.borrow_mut().push(m.to_string()))
            .with_confirm(move |req: ConfirmRequest| {
                confirms.borrow_mut().push(req.message);
                let answer = !decline.get();
                async move { answer }
            })
    }

    pub fn successes(&self) -> Vec<String> {
        self.success.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.error.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warning.borrow().clone()
    }

    pub fn confirm_messages(&self) -> Vec<String> {
        self.confirms.borrow().clone()
    }
}

/// Журнал вызовов фейкового API
#[derive(Clone)]
pub(crate) struct CallLog<A: Clone> {
    calls: Rc<RefCell<Vec<A>>>,
}

impl<A: Clone> Default for CallLog<A> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<A: Clone> CallLog<A> {
    pub fn record(&self, args: A) {
        self.calls.borrow_mut().push(args);
    }

    pub fn calls(&self) -> Vec<A> {
        self.calls.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}
