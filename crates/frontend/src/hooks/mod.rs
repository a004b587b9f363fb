//! Хуки CRUD-страниц: таблица со списком, диалог формы и их композиция.

pub mod crud_page;
pub mod form_dialog;
pub mod table_page;

#[cfg(test)]
pub(crate) mod test_support;

use leptos::prelude::*;

/// Держит флаг загрузки поднятым, пока жив; снимает его на любом выходе из операции.
///
/// Для запросов с номером флаг снимает только последний запущенный запрос.
pub(crate) struct LoadingGuard {
    flag: RwSignal<bool>,
    request: Option<(StoredValue<u64>, u64)>,
}

impl LoadingGuard {
    pub(crate) fn acquire(flag: RwSignal<bool>) -> Self {
        flag.set(true);
        Self {
            flag,
            request: None,
        }
    }

    pub(crate) fn acquire_for_request(flag: RwSignal<bool>, latest: StoredValue<u64>, seq: u64) -> Self {
        flag.set(true);
        Self {
            flag,
            request: Some((latest, seq)),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some((latest, seq)) = self.request {
            if latest.get_value() != seq {
                return;
            }
        }
        self.flag.set(false);
    }
}
