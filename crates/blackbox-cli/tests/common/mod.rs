//! Shared fixtures: an in-memory node and a capturing console

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blackbox_cli::console::{Console, Palette};
use blackbox_core::{BlackboxError, ChatNode, Result};
use libp2p::{Multiaddr, PeerId};

/// Records what the session asks of the network
pub struct MockNode {
    peer_id: PeerId,
    addresses: Mutex<Vec<Multiaddr>>,
    pub connects: Mutex<Vec<Multiaddr>>,
    pub published: Mutex<Vec<Vec<u8>>>,
    connect_error: Mutex<Option<String>>,
    publish_failures: Mutex<usize>,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            peer_id: PeerId::random(),
            addresses: Mutex::new(Vec::new()),
            connects: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            connect_error: Mutex::new(None),
            publish_failures: Mutex::new(0),
        }
    }

    pub fn with_addresses(self, addrs: &[&str]) -> Self {
        *self.addresses.lock().unwrap() = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self
    }

    pub fn set_addresses(&self, addrs: Vec<Multiaddr>) {
        *self.addresses.lock().unwrap() = addrs;
    }

    pub fn fail_connect(&self, reason: &str) {
        *self.connect_error.lock().unwrap() = Some(reason.to_string());
    }

    /// Fail the next `count` publishes
    pub fn fail_publishes(&self, count: usize) {
        *self.publish_failures.lock().unwrap() = count;
    }

    pub fn published_text(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }
}

#[async_trait]
impl ChatNode for MockNode {
    fn local_peer_id(&self) -> PeerId {
        self.peer_id
    }

    async fn addresses(&self) -> Result<Vec<Multiaddr>> {
        Ok(self.addresses.lock().unwrap().clone())
    }

    async fn connect(&self, addr: &Multiaddr) -> Result<()> {
        self.connects.lock().unwrap().push(addr.clone());
        match self.connect_error.lock().unwrap().clone() {
            Some(reason) => Err(BlackboxError::connect(addr.to_string(), reason)),
            None => Ok(()),
        }
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<()> {
        let mut failures = self.publish_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(BlackboxError::publish("InsufficientPeers"));
        }
        self.published.lock().unwrap().push(payload);
        Ok(())
    }
}

/// Console output captured in memory
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

pub fn console() -> (Console, Capture) {
    let capture = Capture::default();
    let console = Console::new(Box::new(capture.clone()), Palette::plain(), "> ");
    (console, capture)
}
