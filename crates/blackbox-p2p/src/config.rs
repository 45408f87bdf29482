//! Settings for constructing a node

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use blackbox_core::DEFAULT_TOPIC;
use libp2p::multiaddr::Protocol;
use libp2p::Multiaddr;

/// Protocol version announced over identify
pub const PROTOCOL_VERSION: &str = "/blackbox/1.0.0";

/// Largest chat frame accepted or sent on the topic (64 KiB)
pub const MAX_MESSAGE_SIZE: usize = 65_536;

/// Everything the bootstrapper needs besides the identity
#[derive(Debug, Clone)]
pub struct NodeSettings {
    /// TCP port for both IPv4 and IPv6 listeners; 0 picks a free port
    pub port: u16,
    /// Relays to reserve a circuit on; empty disables relay assistance
    pub relays: Vec<Multiaddr>,
    pub topic: String,
    pub dial_timeout: Duration,
    pub idle_timeout: Duration,
}

impl NodeSettings {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            relays: Vec::new(),
            topic: DEFAULT_TOPIC.to_string(),
            dial_timeout: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_relays(mut self, relays: Vec<Multiaddr>) -> Self {
        self.relays = relays;
        self
    }

    pub fn with_topic<T: Into<String>>(mut self, topic: T) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn relay_assist(&self) -> bool {
        !self.relays.is_empty()
    }

    /// Unspecified IPv4 and IPv6 TCP addresses on the configured port
    pub fn listen_addrs(&self) -> Vec<Multiaddr> {
        vec![
            Multiaddr::empty()
                .with(Protocol::Ip4(Ipv4Addr::UNSPECIFIED))
                .with(Protocol::Tcp(self.port)),
            Multiaddr::empty()
                .with(Protocol::Ip6(Ipv6Addr::UNSPECIFIED))
                .with(Protocol::Tcp(self.port)),
        ]
    }

    /// Circuit listen addresses, one reservation per relay
    pub fn reservation_addrs(&self) -> Vec<Multiaddr> {
        self.relays
            .iter()
            .map(|relay| relay.clone().with(Protocol::P2pCircuit))
            .collect()
    }
}
