//! Error types for the BlackBox chat node
//!
//! Every fallible operation in the core crate returns [`BlackboxError`]. The
//! variants follow the propagation policy of the node: identity, bootstrap and
//! join-path errors are fatal to the process, while [`BlackboxError::Publish`]
//! is the only error the chat session recovers from.

use std::path::PathBuf;

// ----------------------------------------------------------------------------
// Core Error Type
// ----------------------------------------------------------------------------

/// Core error type for the BlackBox node
#[derive(Debug, thiserror::Error)]
pub enum BlackboxError {
    /// Key file or key directory could not be read, written or created
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted identity exists but cannot be decoded
    #[error("Corrupt identity key at {}: {reason}", path.display())]
    CorruptKey { path: PathBuf, reason: String },

    /// An entry of the `--relays` list is not a usable relay address
    #[error("Invalid relay address {entry:?}: {reason}")]
    InvalidRelayAddress { entry: String, reason: String },

    /// An operator-supplied peer address is malformed
    #[error("Invalid peer address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The substrate failed to establish a connection to the peer
    #[error("Connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    /// Publishing a chat frame to the topic failed
    #[error("Publish failed: {reason}")]
    Publish { reason: String },

    /// Transport, listener or topic setup failed
    #[error("Substrate initialization failed: {reason}")]
    SubstrateInit { reason: String },

    /// The inbound topic channel was closed by the substrate
    #[error("Topic subscription closed")]
    ChannelClosed,

    /// The session was cancelled while waiting
    #[error("Operation cancelled")]
    Cancelled,
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl BlackboxError {
    /// Create an I/O error bound to the path it occurred on
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        BlackboxError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid address error
    pub fn invalid_address<A: Into<String>, R: Into<String>>(address: A, reason: R) -> Self {
        BlackboxError::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a connect error
    pub fn connect<A: Into<String>, R: Into<String>>(address: A, reason: R) -> Self {
        BlackboxError::Connect {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a publish error
    pub fn publish<R: Into<String>>(reason: R) -> Self {
        BlackboxError::Publish {
            reason: reason.into(),
        }
    }

    /// Create a substrate initialization error
    pub fn substrate_init<R: Into<String>>(reason: R) -> Self {
        BlackboxError::SubstrateInit {
            reason: reason.into(),
        }
    }

    /// Whether the chat session may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BlackboxError::Publish { .. })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = std::result::Result<T, BlackboxError>;
