//! Classification of operator input lines

/// Command that prints usage
pub const HELP_COMMAND: &str = "/help";
/// Command that leaves the session
pub const EXIT_COMMAND: &str = "/exit";

/// What a line typed by the operator means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Blank line, only the prompt is redrawn
    Empty,
    Help,
    Exit,
    /// Text to frame and publish
    Chat(String),
}

impl InputCommand {
    /// Classify a raw input line. Surrounding whitespace is ignored.
    pub fn classify(line: &str) -> Self {
        match line.trim() {
            "" => InputCommand::Empty,
            HELP_COMMAND => InputCommand::Help,
            EXIT_COMMAND => InputCommand::Exit,
            text => InputCommand::Chat(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_local_commands() {
        assert_eq!(InputCommand::classify("/help"), InputCommand::Help);
        assert_eq!(InputCommand::classify("  /exit \n"), InputCommand::Exit);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(InputCommand::classify(""), InputCommand::Empty);
        assert_eq!(InputCommand::classify(" \t "), InputCommand::Empty);
    }

    #[test]
    fn everything_else_is_chat() {
        assert_eq!(
            InputCommand::classify("  hello there "),
            InputCommand::Chat("hello there".to_string())
        );
        assert_eq!(
            InputCommand::classify("/help me"),
            InputCommand::Chat("/help me".to_string())
        );
    }
}
