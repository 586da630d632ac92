//! Configuration persisted between runs: the backend address and the
//! matching-strategy settings sent with every request.

pub mod config;

pub use config::{ApiConfig, Config};
