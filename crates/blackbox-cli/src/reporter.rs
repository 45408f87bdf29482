//! Own-address reporting for the host role

use std::time::Duration;

use libp2p::Multiaddr;
use tokio::time::Instant;
use tracing::debug;

use blackbox_core::{group_addresses, is_relay_address, with_peer_id, ChatNode, Result};

use crate::console::Console;

/// Print the node id and its addresses grouped by reach
pub async fn report_own_addresses<N: ChatNode + ?Sized>(node: &N, console: &Console) -> Result<()> {
    let local = node.local_peer_id();
    let groups = group_addresses(&node.addresses().await?, local);

    console.rule();
    console.line(format!("{} {local}", console.palette().label("Node ID:")));

    let sections = [
        ("Other:", &groups.other),
        ("LAN (same Wi-Fi/router only):", &groups.lan),
        ("Loopback (this machine only):", &groups.loopback),
    ];
    for (title, addrs) in sections {
        if addrs.is_empty() {
            continue;
        }
        console.heading(title);
        for addr in addrs {
            console.item(addr);
        }
    }
    console.rule();
    Ok(())
}

/// Poll the node's addresses until a relay circuit address shows up.
///
/// Prints the shareable address and returns it, or prints a hint and returns
/// `None` once `timeout` has passed.
pub async fn wait_for_relay_address<N: ChatNode + ?Sized>(
    node: &N,
    console: &Console,
    timeout: Duration,
    poll: Duration,
) -> Result<Option<Multiaddr>> {
    let deadline = Instant::now() + timeout;
    loop {
        let relayed = node
            .addresses()
            .await?
            .into_iter()
            .find(is_relay_address);

        if let Some(addr) = relayed {
            let shareable = with_peer_id(&addr, node.local_peer_id());
            console.heading("Relay (share this over the internet, no port-forwarding needed):");
            console.item(&shareable);
            return Ok(Some(shareable));
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        debug!("no relay address yet");
        tokio::time::sleep(poll.min(deadline - now)).await;
    }

    console.hint(
        "(No relay address yet. If you're on LAN, use the LAN line; otherwise add --relays or port-forward.)",
    );
    Ok(None)
}

/// Shown to hosts that did not configure any relay
pub fn print_relay_tip(console: &Console) {
    console.hint(
        "Tip: run with --relays <multiaddr,...> to get an address that works across NATs without port-forwarding.",
    );
}
