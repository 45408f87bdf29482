//! Node construction
//!
//! Builds the swarm from an identity and [`NodeSettings`], binds the TCP
//! listeners, joins the chat topic, requests relay reservations and hands the
//! swarm to its driver task.

use std::time::Duration;

use blackbox_core::{NodeIdentity, Subscription};
use libp2p::gossipsub::IdentTopic;
use libp2p::{noise, tcp, yamux, Swarm, SwarmBuilder};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::behaviour::ChatBehaviour;
use crate::config::NodeSettings;
use crate::driver::Driver;
use crate::error::{P2pError, Result};
use crate::node::Libp2pNode;

/// How long to wait for the TCP listeners to report their addresses
const LISTEN_SETTLE: Duration = Duration::from_secs(2);

const COMMAND_BUFFER: usize = 64;

/// Start a node and join its chat topic.
///
/// The IPv4 and IPv6 listeners are bound independently; a host without one of
/// the families still starts, but failing to bind any listener is fatal.
pub async fn bootstrap(
    identity: NodeIdentity,
    settings: &NodeSettings,
) -> blackbox_core::Result<(Libp2pNode, Subscription)> {
    Ok(start(identity, settings).await?)
}

async fn start(identity: NodeIdentity, settings: &NodeSettings) -> Result<(Libp2pNode, Subscription)> {
    let peer_id = identity.peer_id();
    let mut swarm = build_swarm(identity, settings)?;

    let topic = IdentTopic::new(settings.topic.clone());
    swarm
        .behaviour_mut()
        .gossipsub
        .subscribe(&topic)
        .map_err(|e| P2pError::Subscribe {
            topic: settings.topic.clone(),
            reason: e.to_string(),
        })?;

    let mut started = 0;
    let mut last_error = None;
    for addr in settings.listen_addrs() {
        match swarm.listen_on(addr.clone()) {
            Ok(_) => started += 1,
            Err(e) => {
                warn!(%addr, error = %e, "failed to listen");
                last_error = Some(format!("{addr}: {e}"));
            }
        }
    }
    if started == 0 {
        return Err(P2pError::Listen(last_error.unwrap_or_default()));
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (inbound_tx, subscription) = Subscription::channel();
    let mut driver = Driver::new(swarm, topic, command_rx, inbound_tx);

    if driver.await_listeners(started, LISTEN_SETTLE).await == 0 {
        return Err(P2pError::Listen("no listener reported an address".to_string()));
    }

    for addr in settings.reservation_addrs() {
        match driver.swarm_mut().listen_on(addr.clone()) {
            Ok(_) => info!(relay = %addr, "requested relay reservation"),
            Err(e) => warn!(relay = %addr, error = %e, "relay reservation failed"),
        }
    }

    tokio::spawn(driver.run());
    info!(%peer_id, topic = %settings.topic, "node started");

    Ok((
        Libp2pNode::new(peer_id, command_tx, settings.dial_timeout),
        subscription,
    ))
}

pub(crate) fn build_swarm(identity: NodeIdentity, settings: &NodeSettings) -> Result<Swarm<ChatBehaviour>> {
    let relay_assist = settings.relay_assist();
    let idle_timeout = settings.idle_timeout;

    let swarm = SwarmBuilder::with_existing_identity(identity.into_keypair())
        .with_tokio()
        .with_tcp(
            tcp::Config::default().nodelay(true),
            noise::Config::new,
            yamux::Config::default,
        )
        .map_err(P2pError::transport)?
        .with_dns()
        .map_err(P2pError::transport)?
        .with_relay_client(noise::Config::new, yamux::Config::default)
        .map_err(P2pError::transport)?
        .with_behaviour(|key, relay_client| {
            ChatBehaviour::new(key, relay_client, relay_assist)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        })
        .map_err(|e| P2pError::Behaviour(e.to_string()))?
        .with_swarm_config(|cfg| cfg.with_idle_connection_timeout(idle_timeout))
        .build();

    Ok(swarm)
}
