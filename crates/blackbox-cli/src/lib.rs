//! BlackBox CLI library
//!
//! Components of the `blackbox` terminal chat: argument and configuration
//! handling, startup prompts, address reporting and the chat session loop.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod prompt;
pub mod reporter;
pub mod session;

pub use app::BlackboxApp;
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use session::{ChatSession, Role, SessionEnd};
