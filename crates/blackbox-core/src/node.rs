//! The seam between the chat layer and the networking substrate
//!
//! The chat session only needs four things from the network: who it is, where
//! it can be reached, how to connect to a peer and how to publish to the
//! topic. Inbound topic traffic arrives on a [`Subscription`].

use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{BlackboxError, Result};

/// A message received on the chat topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Node that authored the message
    pub origin: PeerId,
    pub data: Vec<u8>,
}

/// Handle to a running node joined to the chat topic
#[async_trait]
pub trait ChatNode: Send + Sync {
    fn local_peer_id(&self) -> PeerId;

    /// Listen and externally observed addresses, relay circuits included
    async fn addresses(&self) -> Result<Vec<Multiaddr>>;

    /// Dial `addr` once and wait for the connection to be established
    async fn connect(&self, addr: &Multiaddr) -> Result<()>;

    /// Publish raw bytes to the chat topic
    async fn publish(&self, payload: Vec<u8>) -> Result<()>;
}

// ----------------------------------------------------------------------------
// Subscription
// ----------------------------------------------------------------------------

/// Receiving end of the chat topic
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<InboundMessage>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<InboundMessage>) -> Self {
        Self { rx }
    }

    /// Create a subscription together with the sender that feeds it
    pub fn channel() -> (mpsc::UnboundedSender<InboundMessage>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Wait for the next message.
    ///
    /// Returns [`BlackboxError::Cancelled`] once `cancel` fires and
    /// [`BlackboxError::ChannelClosed`] when the substrate stops delivering.
    pub async fn next(&mut self, cancel: &CancellationToken) -> Result<InboundMessage> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(BlackboxError::Cancelled),
            message = self.rx.recv() => message.ok_or(BlackboxError::ChannelClosed),
        }
    }
}
