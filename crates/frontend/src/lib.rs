pub mod hooks;
pub mod shared;

pub use hooks::crud_page::{use_crud_page, CrudConfig, CrudPage, CrudPageConfig, SimpleCrudConfig};
pub use hooks::form_dialog::{use_form_dialog, FormDialog, FormDialogConfig};
pub use hooks::table_page::{use_table_page, DeleteConfig, ExportConfig, TablePage, TablePageConfig};

/// Логирование в консоль браузера и вывод паники; вызывается один раз при старте приложения
pub fn init_logging() {
    _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
}
