//! BlackBox libp2p Substrate
//!
//! Implements [`blackbox_core::ChatNode`] on rust-libp2p: TCP with Noise and
//! Yamux, gossipsub for the chat topic, identify and ping, UPnP port mapping,
//! and, when relays are configured, circuit relay reservations with DCUtR
//! hole punching.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod behaviour;
pub mod bootstrap;
pub mod config;
mod driver;
pub mod error;
pub mod node;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use bootstrap::bootstrap;
pub use config::NodeSettings;
pub use error::P2pError;
pub use node::Libp2pNode;
