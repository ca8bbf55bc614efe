//! Contacts CLI library
//!
//! Terminal host for the contacts browser: configuration, settings and
//! contact persistence, the JSON-lines interchange format, platform
//! adapters and plain-text views.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod interchange;
pub mod platform;
pub mod prompt;
pub mod settings;
pub mod store;
pub mod views;

pub use app::ContactsApp;
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
