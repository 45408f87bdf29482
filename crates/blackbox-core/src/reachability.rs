//! Best-effort TCP reachability probe
//!
//! Before a joiner connects it checks whether the target's TCP endpoint
//! accepts connections at all. The answer is advisory: a `false` only
//! triggers a firewall notice, the real connect still happens.

use std::net::SocketAddr;
use std::time::Duration;

use libp2p::Multiaddr;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::address::{probe_target, ProbeHost, ProbeTarget};

/// Whether any TCP target derived from `addrs` accepts a connection.
///
/// Addresses whose shape is not understood are skipped silently. Each target
/// is dialed once; the first success wins and the socket is dropped at once.
pub async fn is_reachable(addrs: &[Multiaddr], limit: Duration) -> bool {
    for addr in addrs {
        let Some(target) = probe_target(addr) else {
            continue;
        };
        if dial_once(&target, limit).await {
            return true;
        }
    }
    false
}

async fn dial_once(target: &ProbeTarget, limit: Duration) -> bool {
    let attempt = match &target.host {
        ProbeHost::Ip(ip) => timeout(limit, TcpStream::connect(SocketAddr::new(*ip, target.port))).await,
        ProbeHost::Name(name) => timeout(limit, TcpStream::connect((name.as_str(), target.port))).await,
    };

    match attempt {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(?target, error = %e, "probe dial failed");
            false
        }
        Err(_) => {
            debug!(?target, ?limit, "probe dial timed out");
            false
        }
    }
}
