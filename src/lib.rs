pub mod api_client;
pub mod config;
pub mod key_combo;
pub mod logging;
pub mod models;
pub mod selector;
pub mod session;
pub mod ui;
pub mod utils;
