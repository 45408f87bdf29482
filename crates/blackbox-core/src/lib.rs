//! BlackBox Core
//!
//! Substrate-independent pieces of the BlackBox peer-to-peer chat node: the
//! persistent identity store, chat framing and input commands, relay and peer
//! address parsing, the reachability probe, and the [`ChatNode`] trait the
//! session loop drives.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod address;
pub mod errors;
pub mod identity;
pub mod node;
pub mod protocol;
pub mod reachability;
pub mod relay;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use address::{
    group_addresses, is_relay_address, parse_peer_address, with_peer_id, AddressClass,
    AddressGroups, PeerAddress,
};
pub use errors::{BlackboxError, Result};
pub use identity::{ensure_identity, key_path, NodeIdentity};
pub use node::{ChatNode, InboundMessage, Subscription};
pub use protocol::{ChatMessage, InputCommand, ParsedMessage, DEFAULT_TOPIC};
pub use reachability::is_reachable;
pub use relay::parse_relays;
