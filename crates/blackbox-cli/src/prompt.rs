//! Interactive startup prompts
//!
//! The same line reader is used for the prompts and, afterwards, for the chat
//! session, so input typed ahead is never lost between the two.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use blackbox_core::protocol::FRAME_DELIMITER;
use blackbox_core::{parse_peer_address, PeerAddress};

use crate::console::Console;
use crate::error::{CliError, Result};
use crate::session::Role;

/// Name used when the operator leaves the name prompt empty
pub const DEFAULT_NAME: &str = "Anonymous";

pub struct Prompter<R> {
    lines: Lines<R>,
}

/// Prompter reading from the process's standard input
pub fn stdin() -> Prompter<BufReader<Stdin>> {
    Prompter::new(BufReader::new(tokio::io::stdin()))
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    async fn ask(&mut self, console: &Console, question: &str) -> Result<String> {
        console.ask(question);
        match self.lines.next_line().await? {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(CliError::Prompt("input closed before an answer was given".to_string())),
        }
    }

    /// Ask whether to host or join
    pub async fn role(&mut self, console: &Console) -> Result<Role> {
        let answer = self.ask(console, "Host a new chat or join one? [host/join]:").await?;
        match answer.to_ascii_lowercase().as_str() {
            "h" | "host" => Ok(Role::Host),
            "j" | "join" => Ok(Role::Join),
            other => Err(CliError::Prompt(format!("unknown choice {other:?}, expected host or join"))),
        }
    }

    /// Ask for the address to join
    pub async fn join_address(&mut self, console: &Console) -> Result<PeerAddress> {
        let answer = self.ask(console, "Enter the connection address:").await?;
        Ok(parse_peer_address(&answer)?)
    }

    /// Ask for the display name; an empty answer picks [`DEFAULT_NAME`]
    pub async fn display_name(&mut self, console: &Console) -> Result<String> {
        let answer = self.ask(console, "Enter your username:").await?;
        validate_name(&answer)
    }

    /// Hand the remaining input over to the chat session
    pub fn into_lines(self) -> Lines<R> {
        self.lines
    }
}

/// Normalize a display name. Names containing the frame delimiter would be
/// split wrongly by every receiver and are refused.
pub fn validate_name(input: &str) -> Result<String> {
    let name = input.trim();
    if name.is_empty() {
        return Ok(DEFAULT_NAME.to_string());
    }
    if name.contains(FRAME_DELIMITER) {
        return Err(CliError::Prompt(format!(
            "display name must not contain {FRAME_DELIMITER:?}"
        )));
    }
    Ok(name.to_string())
}
