//! Chat session
//!
//! After bootstrap exactly two activities run: a spawned receiver that renders
//! topic messages, and the input reader in the calling task that dispatches
//! commands and publishes chat lines. They share the console and one
//! cancellation token. The session ends on `/exit`, on a shutdown signal, or
//! when the topic subscription closes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, Lines};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use blackbox_core::{
    is_reachable, BlackboxError, ChatMessage, ChatNode, InputCommand, ParsedMessage, PeerAddress,
    Subscription,
};
use libp2p::PeerId;

use crate::console::Console;
use crate::error::Result;

/// Which side of the chat this node starts as; fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Join,
}

/// Why a session or startup path finished without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Operator typed `/exit`
    Exit,
    /// SIGINT or SIGTERM
    Interrupted,
    /// The substrate stopped delivering topic messages
    SubscriptionClosed,
    /// The join target was this node itself
    AlreadyHosting,
}

/// Printed when a shutdown signal ends the run
pub(crate) const SHUTDOWN_NOTICE: &str = "Received shutdown signal, shutting down cleanly.";

// ----------------------------------------------------------------------------
// Joining
// ----------------------------------------------------------------------------

/// Result of the joiner's connect step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Connected,
    AlreadyHosting,
}

/// Connect to `target`: self check, advisory probe, then one connect attempt
pub async fn join<N: ChatNode + ?Sized>(
    node: &N,
    console: &Console,
    target: &PeerAddress,
    probe_timeout: Duration,
) -> Result<JoinOutcome> {
    let local = node.local_peer_id();
    if target.peer_id() == local {
        console.line("You are already hosting this chat; there is nothing to join.");
        return Ok(JoinOutcome::AlreadyHosting);
    }

    if !is_reachable(&[target.transport_addr()], probe_timeout).await {
        console.warning(
            "The peer did not answer a direct TCP check. It may be behind a firewall or NAT; trying anyway...",
        );
    }

    node.connect(target.multiaddr()).await.map_err(|e| match e {
        BlackboxError::Connect { .. } => e,
        other => BlackboxError::connect(target.to_string(), other.to_string()),
    })?;
    info!(peer = %target.peer_id(), "connected to chat peer");

    console.banner(&[
        "✓ Successfully connected to the chat!".to_string(),
        format!("Node:   libp2p peer {local}"),
        format!("Target: {target}"),
    ]);
    console.hint("You can start typing messages now. Type /help to see available commands.");
    Ok(JoinOutcome::Connected)
}

// ----------------------------------------------------------------------------
// Session Loop
// ----------------------------------------------------------------------------

enum Flow {
    Continue,
    Exit,
}

pub struct ChatSession<N: ?Sized> {
    node: Arc<N>,
    console: Console,
    name: String,
    cancel: CancellationToken,
}

impl<N: ChatNode + ?Sized + 'static> ChatSession<N> {
    pub fn new(node: Arc<N>, console: Console, name: impl Into<String>) -> Self {
        Self {
            node,
            console,
            name: name.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Run until `/exit`, `shutdown` resolves, or the subscription closes.
    ///
    /// End of input stops reading but not the session: inbound messages keep
    /// rendering until a signal or channel closure.
    pub async fn run<R, S>(
        self,
        subscription: Subscription,
        mut lines: Lines<R>,
        shutdown: S,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let mut receiver = spawn_receiver(
            subscription,
            self.console.clone(),
            self.node.local_peer_id(),
            self.cancel.clone(),
        );
        tokio::pin!(shutdown);

        let mut input_open = true;
        self.console.prompt();

        let end = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    self.console.blank();
                    self.console.line(SHUTDOWN_NOTICE);
                    break SessionEnd::Interrupted;
                }
                _ = &mut receiver => {
                    self.console.blank();
                    self.console.warning("Chat subscription closed.");
                    break SessionEnd::SubscriptionClosed;
                }
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => match self.handle_line(&line).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Exit) => break SessionEnd::Exit,
                        Err(e) => {
                            self.cancel.cancel();
                            return Err(e);
                        }
                    },
                    Ok(None) => {
                        debug!("operator input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read input");
                        input_open = false;
                    }
                },
            }
        };

        self.cancel.cancel();
        Ok(end)
    }

    async fn handle_line(&self, line: &str) -> Result<Flow> {
        match InputCommand::classify(line) {
            InputCommand::Empty => {}
            InputCommand::Help => self.console.help(),
            InputCommand::Exit => {
                self.console.line("Disconnecting from the chat. Goodbye.");
                return Ok(Flow::Exit);
            }
            InputCommand::Chat(text) => {
                let frame = ChatMessage::new(self.name.as_str(), text.as_str());
                match self.node.publish(frame.to_bytes()).await {
                    Ok(()) => self.console.outgoing(&self.name, &text),
                    Err(e) if e.is_recoverable() => {
                        self.console.error(&format!("message not sent: {e}"));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.console.prompt();
        Ok(Flow::Continue)
    }
}

/// Render inbound topic messages until cancelled or the channel closes
fn spawn_receiver(
    mut subscription: Subscription,
    console: Console,
    local: PeerId,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match subscription.next(&cancel).await {
                Ok(message) if message.origin == local => {}
                Ok(message) => console.incoming(&ParsedMessage::from_payload(&message.data)),
                Err(BlackboxError::Cancelled) => break,
                Err(e) => {
                    debug!(error = %e, "receiver stopping");
                    break;
                }
            }
        }
    })
}
