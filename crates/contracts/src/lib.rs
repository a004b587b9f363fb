//! Общие контракты CRUD-страниц: модели пагинации, преобразования полей,
//! разбор ответов списочных API и таксономия ошибок.
//!
//! Крейт не зависит от UI-фреймворка, поэтому всё здесь синхронно и чисто.

pub mod shared;
