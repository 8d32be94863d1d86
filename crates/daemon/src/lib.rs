#![forbid(unsafe_code)]

//! HTTP front end for distribution creation.

pub mod config;
pub mod http;

pub use config::DaemonConfig;
pub use http::{router, AppState};
