//! Combined network behaviour
//!
//! Composes:
//! - gossipsub with signed messages, carrying the chat topic
//! - identify and ping for peer metadata and liveness
//! - the circuit relay client, so any node can dial `/p2p-circuit` addresses
//! - DCUtR hole punching, active only when relays are configured
//! - UPnP port mapping on the local gateway

use std::time::Duration;

use libp2p::identity::Keypair;
use libp2p::swarm::behaviour::toggle::Toggle;
use libp2p::swarm::NetworkBehaviour;
use libp2p::{dcutr, gossipsub, identify, ping, relay, upnp};

use crate::config::{MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
use crate::error::P2pError;

#[derive(NetworkBehaviour)]
pub struct ChatBehaviour {
    pub gossipsub: gossipsub::Behaviour,
    pub identify: identify::Behaviour,
    pub ping: ping::Behaviour,
    pub relay_client: relay::client::Behaviour,
    pub dcutr: Toggle<dcutr::Behaviour>,
    pub upnp: upnp::tokio::Behaviour,
}

impl ChatBehaviour {
    /// Build the behaviour for `key`. The relay client comes from the swarm
    /// builder and is always kept; hole punching needs `relay_assist`.
    pub fn new(
        key: &Keypair,
        relay_client: relay::client::Behaviour,
        relay_assist: bool,
    ) -> Result<Self, P2pError> {
        let local_peer_id = key.public().to_peer_id();

        let dcutr = relay_assist.then(|| {
            tracing::debug!("hole punching enabled");
            dcutr::Behaviour::new(local_peer_id)
        });

        Ok(Self {
            gossipsub: build_gossipsub(key)?,
            identify: identify::Behaviour::new(identify::Config::new(
                PROTOCOL_VERSION.to_string(),
                key.public(),
            )),
            ping: ping::Behaviour::new(ping::Config::new()),
            relay_client,
            dcutr: Toggle::from(dcutr),
            upnp: upnp::tokio::Behaviour::default(),
        })
    }
}

fn build_gossipsub(key: &Keypair) -> Result<gossipsub::Behaviour, P2pError> {
    let config = gossipsub::ConfigBuilder::default()
        .heartbeat_interval(Duration::from_secs(1))
        .validation_mode(gossipsub::ValidationMode::Strict)
        .max_transmit_size(MAX_MESSAGE_SIZE)
        .build()
        .map_err(|e| P2pError::Behaviour(format!("invalid gossipsub config: {e}")))?;

    gossipsub::Behaviour::new(gossipsub::MessageAuthenticity::Signed(key.clone()), config)
        .map_err(|e| P2pError::Behaviour(format!("failed to create gossipsub: {e}")))
}
