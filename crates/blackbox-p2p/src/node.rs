//! Node handle backed by the swarm driver

use std::time::Duration;

use async_trait::async_trait;
use blackbox_core::{ChatNode, Result as CoreResult};
use libp2p::{Multiaddr, PeerId};
use tokio::sync::{mpsc, oneshot};

use crate::driver::Command;
use crate::error::{P2pError, Result};

/// Cloneable handle to a running libp2p node
#[derive(Debug, Clone)]
pub struct Libp2pNode {
    peer_id: PeerId,
    commands: mpsc::Sender<Command>,
    dial_timeout: Duration,
}

impl Libp2pNode {
    pub(crate) fn new(peer_id: PeerId, commands: mpsc::Sender<Command>, dial_timeout: Duration) -> Self {
        Self {
            peer_id,
            commands,
            dial_timeout,
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| P2pError::DriverStopped)?;
        rx.await.map_err(|_| P2pError::DriverStopped)
    }

    pub async fn dial(&self, addr: &Multiaddr) -> Result<()> {
        let addr = addr.clone();
        let pending = self.request(|reply| Command::Dial {
            addr: addr.clone(),
            reply,
        });
        match tokio::time::timeout(self.dial_timeout, pending).await {
            Ok(result) => result?,
            Err(_) => Err(P2pError::DialTimeout {
                address: addr.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ChatNode for Libp2pNode {
    fn local_peer_id(&self) -> PeerId {
        self.peer_id
    }

    async fn addresses(&self) -> CoreResult<Vec<Multiaddr>> {
        Ok(self.request(|reply| Command::Addresses { reply }).await?)
    }

    async fn connect(&self, addr: &Multiaddr) -> CoreResult<()> {
        Ok(self.dial(addr).await?)
    }

    async fn publish(&self, payload: Vec<u8>) -> CoreResult<()> {
        Ok(self.request(|reply| Command::Publish { data: payload, reply }).await??)
    }
}
