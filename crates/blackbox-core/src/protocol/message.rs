//! Chat message framing
//!
//! Messages travel on the topic as UTF-8 text of the form `[name]:body`. There
//! is no length prefix, sequence number or escaping; the frame is recognized
//! only when the text contains `]:` and the part before the first occurrence
//! starts with `[`. Anything else is an unframed message shown verbatim.

use std::fmt;

/// Separator between the bracketed sender name and the body
pub const FRAME_DELIMITER: &str = "]:";

// ----------------------------------------------------------------------------
// Chat Message
// ----------------------------------------------------------------------------

/// A display name paired with the text it sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
}

impl ChatMessage {
    pub fn new<S: Into<String>, B: Into<String>>(sender: S, body: B) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Wire representation, `[sender]:body`
    pub fn frame(&self) -> String {
        format!("[{}]{}{}", self.sender, FRAME_DELIMITER, self.body)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.frame().into_bytes()
    }
}

// ----------------------------------------------------------------------------
// Inbound Parsing
// ----------------------------------------------------------------------------

/// Result of reading a payload received on the topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Framed(ChatMessage),
    /// Text that did not follow the frame; rendered as-is
    Unframed(String),
}

impl ParsedMessage {
    /// Parse received text. Never fails: malformed frames fall back to
    /// [`ParsedMessage::Unframed`].
    pub fn parse(text: &str) -> Self {
        match text.split_once(FRAME_DELIMITER) {
            Some((head, body)) if head.starts_with('[') => {
                ParsedMessage::Framed(ChatMessage::new(&head[1..], body))
            }
            _ => ParsedMessage::Unframed(text.to_string()),
        }
    }

    /// Parse a raw payload, replacing invalid UTF-8 sequences
    pub fn from_payload(payload: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(payload))
    }
}

impl fmt::Display for ParsedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedMessage::Framed(message) => write!(f, "{}: {}", message.sender, message.body),
            ParsedMessage::Unframed(text) => f.write_str(text),
        }
    }
}
