//! Swarm driver task
//!
//! The swarm is owned by a single task that multiplexes handle commands with
//! swarm events. Handles talk to it over an mpsc channel and get answers on
//! oneshot channels; topic messages are forwarded to the subscription.

use std::collections::HashMap;
use std::time::Duration;

use blackbox_core::InboundMessage;
use futures::StreamExt;
use libp2p::gossipsub::{self, IdentTopic};
use libp2p::swarm::dial_opts::DialOpts;
use libp2p::swarm::{ConnectionId, SwarmEvent};
use libp2p::{dcutr, identify, relay, upnp, Multiaddr, Swarm};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::behaviour::{ChatBehaviour, ChatBehaviourEvent};
use crate::error::{P2pError, Result};

/// Requests a node handle sends to the driver
#[derive(Debug)]
pub(crate) enum Command {
    Dial {
        addr: Multiaddr,
        reply: oneshot::Sender<Result<()>>,
    },
    Publish {
        data: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    Addresses {
        reply: oneshot::Sender<Vec<Multiaddr>>,
    },
}

pub(crate) struct Driver {
    swarm: Swarm<ChatBehaviour>,
    topic: IdentTopic,
    commands: mpsc::Receiver<Command>,
    inbound: mpsc::UnboundedSender<InboundMessage>,
    pending_dials: HashMap<ConnectionId, (Multiaddr, oneshot::Sender<Result<()>>)>,
}

impl Driver {
    pub(crate) fn new(
        swarm: Swarm<ChatBehaviour>,
        topic: IdentTopic,
        commands: mpsc::Receiver<Command>,
        inbound: mpsc::UnboundedSender<InboundMessage>,
    ) -> Self {
        Self {
            swarm,
            topic,
            commands,
            inbound,
            pending_dials: HashMap::new(),
        }
    }

    pub(crate) fn swarm_mut(&mut self) -> &mut Swarm<ChatBehaviour> {
        &mut self.swarm
    }

    /// Drive the swarm until `expected` listeners report an address or
    /// `limit` elapses. Returns how many did.
    pub(crate) async fn await_listeners(&mut self, expected: usize, limit: Duration) -> usize {
        let deadline = Instant::now() + limit;
        loop {
            let bound = self.swarm.listeners().count();
            if bound >= expected {
                return bound;
            }
            match tokio::time::timeout_at(deadline, self.swarm.select_next_some()).await {
                Ok(event) => self.handle_event(event),
                Err(_) => return self.swarm.listeners().count(),
            }
        }
    }

    /// Run until every node handle is dropped
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                event = self.swarm.select_next_some() => self.handle_event(event),
            }
        }
        debug!("all node handles dropped, swarm driver stopping");
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Dial { addr, reply } => {
                self.forget_abandoned_dials();
                let opts = DialOpts::from(addr.clone());
                let connection_id = opts.connection_id();
                match self.swarm.dial(opts) {
                    Ok(()) => {
                        debug!(%addr, ?connection_id, "dialing");
                        self.pending_dials.insert(connection_id, (addr, reply));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(P2pError::dial(&addr, e)));
                    }
                }
            }
            Command::Publish { data, reply } => {
                let result = self
                    .swarm
                    .behaviour_mut()
                    .gossipsub
                    .publish(self.topic.clone(), data)
                    .map(|id| trace!(message_id = %id, "published"))
                    .map_err(P2pError::from);
                let _ = reply.send(result);
            }
            Command::Addresses { reply } => {
                let _ = reply.send(self.addresses());
            }
        }
    }

    /// Drop dials whose handle stopped waiting, e.g. after its dial timeout
    fn forget_abandoned_dials(&mut self) {
        self.pending_dials.retain(|connection_id, (addr, reply)| {
            let waiting = !reply.is_closed();
            if !waiting {
                trace!(%addr, ?connection_id, "dial abandoned by caller");
            }
            waiting
        });
    }

    fn addresses(&self) -> Vec<Multiaddr> {
        let mut addrs: Vec<Multiaddr> = self.swarm.listeners().cloned().collect();
        for addr in self.swarm.external_addresses() {
            if !addrs.contains(addr) {
                addrs.push(addr.clone());
            }
        }
        addrs
    }

    // ------------------------------------------------------------------------
    // Swarm Events
    // ------------------------------------------------------------------------

    fn handle_event(&mut self, event: SwarmEvent<ChatBehaviourEvent>) {
        match event {
            SwarmEvent::NewListenAddr { address, .. } => {
                info!(%address, "listening");
            }
            SwarmEvent::ExternalAddrConfirmed { address } => {
                info!(%address, "external address confirmed");
            }
            SwarmEvent::ListenerClosed { addresses, reason, .. } => {
                debug!(?addresses, ?reason, "listener closed");
            }
            SwarmEvent::ConnectionEstablished {
                peer_id,
                connection_id,
                endpoint,
                ..
            } => {
                debug!(%peer_id, ?endpoint, "connection established");
                if let Some((_, reply)) = self.pending_dials.remove(&connection_id) {
                    let _ = reply.send(Ok(()));
                }
            }
            SwarmEvent::OutgoingConnectionError {
                connection_id,
                peer_id,
                error,
            } => {
                warn!(?peer_id, %error, "outgoing connection failed");
                if let Some((addr, reply)) = self.pending_dials.remove(&connection_id) {
                    let _ = reply.send(Err(P2pError::dial(addr, error)));
                }
            }
            SwarmEvent::ConnectionClosed { peer_id, cause, .. } => {
                debug!(%peer_id, ?cause, "connection closed");
            }
            SwarmEvent::Behaviour(event) => self.handle_behaviour_event(event),
            other => trace!(?other, "unhandled swarm event"),
        }
    }

    fn handle_behaviour_event(&mut self, event: ChatBehaviourEvent) {
        match event {
            ChatBehaviourEvent::Gossipsub(gossipsub::Event::Message {
                propagation_source,
                message,
                ..
            }) => {
                if message.topic != self.topic.hash() {
                    return;
                }
                let inbound = InboundMessage {
                    origin: message.source.unwrap_or(propagation_source),
                    data: message.data,
                };
                if self.inbound.send(inbound).is_err() {
                    trace!("subscription dropped, discarding message");
                }
            }
            ChatBehaviourEvent::Gossipsub(gossipsub::Event::Subscribed { peer_id, topic }) => {
                debug!(%peer_id, %topic, "peer joined topic");
            }
            ChatBehaviourEvent::Gossipsub(other) => trace!(?other, "gossipsub event"),
            ChatBehaviourEvent::Identify(identify::Event::Received { peer_id, info, .. }) => {
                debug!(%peer_id, agent = %info.agent_version, "identified peer");
            }
            ChatBehaviourEvent::Identify(_) | ChatBehaviourEvent::Ping(_) => {}
            ChatBehaviourEvent::RelayClient(
                relay::client::Event::ReservationReqAccepted { relay_peer_id, .. },
            ) => {
                info!(%relay_peer_id, "relay reservation accepted");
            }
            ChatBehaviourEvent::RelayClient(other) => debug!(?other, "relay client event"),
            ChatBehaviourEvent::Dcutr(dcutr::Event {
                remote_peer_id,
                result,
            }) => match result {
                Ok(connection_id) => {
                    info!(%remote_peer_id, ?connection_id, "hole punch succeeded")
                }
                Err(e) => debug!(%remote_peer_id, error = %e, "hole punch failed"),
            },
            ChatBehaviourEvent::Upnp(upnp::Event::NewExternalAddr(addr)) => {
                info!(%addr, "UPnP mapped external address");
            }
            ChatBehaviourEvent::Upnp(upnp::Event::GatewayNotFound) => {
                debug!("no UPnP gateway found");
            }
            ChatBehaviourEvent::Upnp(other) => debug!(?other, "UPnP event"),
        }
    }
}
