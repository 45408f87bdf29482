//! Chat protocol: topic, wire framing and input commands

pub mod command;
pub mod message;

pub use command::{InputCommand, EXIT_COMMAND, HELP_COMMAND};
pub use message::{ChatMessage, ParsedMessage, FRAME_DELIMITER};

/// The single broadcast topic every node joins
pub const DEFAULT_TOPIC: &str = "blackbox/lobby";
