pub mod api;
pub mod export;
pub mod message;
pub mod table_config;
