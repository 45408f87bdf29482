//! Substrate error types

use blackbox_core::BlackboxError;
use libp2p::gossipsub;

/// Errors raised while building or driving the libp2p swarm
#[derive(Debug, thiserror::Error)]
pub enum P2pError {
    #[error("Transport setup failed: {0}")]
    Transport(String),

    #[error("Behaviour setup failed: {0}")]
    Behaviour(String),

    #[error("No listen address could be bound: {0}")]
    Listen(String),

    #[error("Failed to subscribe to topic {topic}: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Publish failed: {0}")]
    Publish(#[from] gossipsub::PublishError),

    #[error("Dial {address} failed: {reason}")]
    Dial { address: String, reason: String },

    #[error("Dial {address} timed out")]
    DialTimeout { address: String },

    #[error("Swarm driver is no longer running")]
    DriverStopped,
}

impl P2pError {
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        P2pError::Transport(err.to_string())
    }

    pub fn dial<A: std::fmt::Display, E: std::fmt::Display>(address: A, err: E) -> Self {
        P2pError::Dial {
            address: address.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<P2pError> for BlackboxError {
    fn from(err: P2pError) -> Self {
        match err {
            P2pError::Publish(e) => BlackboxError::publish(e.to_string()),
            P2pError::Dial { address, reason } => BlackboxError::connect(address, reason),
            P2pError::DialTimeout { address } => BlackboxError::connect(address, "timed out"),
            P2pError::DriverStopped => BlackboxError::ChannelClosed,
            other => BlackboxError::substrate_init(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, P2pError>;
