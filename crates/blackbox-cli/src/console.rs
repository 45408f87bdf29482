//! Terminal output shared by the prompts, reporter and session tasks
//!
//! Both session tasks print while the operator may be typing, so every write
//! goes through one lock and inbound lines first return the cursor to column
//! zero, then redraw the prompt afterwards.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use blackbox_core::protocol::{EXIT_COMMAND, HELP_COMMAND};
use blackbox_core::ParsedMessage;
use crossterm::style::Stylize;

// ----------------------------------------------------------------------------
// Palette
// ----------------------------------------------------------------------------

/// Colours for the different kinds of output; plain text when disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn remote_name(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().bold().to_string())
    }

    pub fn own_name(&self, text: &str) -> String {
        self.paint(text, |t| t.blue().bold().to_string())
    }

    pub fn label(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().to_string())
    }

    pub fn banner(&self, text: &str) -> String {
        self.paint(text, |t| t.green().bold().to_string())
    }

    pub fn hint(&self, text: &str) -> String {
        self.paint(text, |t| t.dim().to_string())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red().bold().to_string())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }
}

// ----------------------------------------------------------------------------
// Console
// ----------------------------------------------------------------------------

const RULE: &str = "──────────────────────────────────────────";

/// Line-oriented writer shared between tasks
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    palette: Palette,
    prompt: String,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, palette: Palette, prompt: impl Into<String>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            palette,
            prompt: prompt.into(),
        }
    }

    pub fn stdout(palette: Palette, prompt: impl Into<String>) -> Self {
        Self::new(Box::new(io::stdout()), palette, prompt)
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        // Output errors (closed terminal) are not worth aborting the chat for
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    pub fn line(&self, text: impl Display) {
        self.write(&format!("{text}\n"));
    }

    pub fn blank(&self) {
        self.write("\n");
    }

    /// Redraw the input prompt without a newline
    pub fn prompt(&self) {
        self.write(&self.prompt);
    }

    pub fn ask(&self, question: &str) {
        self.write(&format!("{} ", self.palette.label(question)));
    }

    pub fn heading(&self, text: &str) {
        self.line(self.palette.label(&format!("→ {text}")));
    }

    pub fn item(&self, text: impl Display) {
        self.line(format!("   {text}"));
    }

    pub fn rule(&self) {
        self.line(RULE);
    }

    pub fn hint(&self, text: &str) {
        self.line(self.palette.hint(text));
    }

    pub fn warning(&self, text: &str) {
        self.line(self.palette.warning(&format!("! {text}")));
    }

    pub fn error(&self, text: &str) {
        self.line(format!("{} {text}", self.palette.error("error:")));
    }

    /// A message from another participant, followed by a fresh prompt
    pub fn incoming(&self, message: &ParsedMessage) {
        let rendered = match message {
            ParsedMessage::Framed(m) => {
                format!("{}: {}", self.palette.remote_name(&m.sender), m.body)
            }
            ParsedMessage::Unframed(text) => text.clone(),
        };
        self.write(&format!("\r{rendered}\n{}", self.prompt));
    }

    /// Local echo of a line this node sent
    pub fn outgoing(&self, name: &str, body: &str) {
        self.line(format!("{}: {body}", self.palette.own_name(name)));
    }

    pub fn banner(&self, lines: &[String]) {
        self.rule();
        for line in lines {
            self.line(self.palette.banner(line));
        }
        self.rule();
    }

    pub fn help(&self) {
        self.line(self.palette.label("Commands:"));
        self.line(format!("  {HELP_COMMAND:<8} show this help"));
        self.line(format!("  {EXIT_COMMAND:<8} leave the chat"));
        self.line(self.palette.hint("Anything else is sent to everyone in the lobby."));
    }
}
