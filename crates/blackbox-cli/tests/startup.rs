//! Joiner and host startup paths against an in-memory node

mod common;

use std::time::Duration;

use blackbox_cli::reporter::{report_own_addresses, wait_for_relay_address};
use blackbox_cli::session::{join, JoinOutcome};
use blackbox_cli::CliError;
use blackbox_core::{parse_peer_address, BlackboxError, ChatNode};
use libp2p::{Multiaddr, PeerId};
use tokio::net::TcpListener;

use common::{console, MockNode};

const PROBE: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_joining_yourself_never_connects() {
    let node = MockNode::new();
    let (console, capture) = console();
    let target =
        parse_peer_address(&format!("/ip4/127.0.0.1/tcp/4001/p2p/{}", node.local_peer_id())).unwrap();

    let outcome = join(&node, &console, &target, PROBE).await.unwrap();

    assert_eq!(outcome, JoinOutcome::AlreadyHosting);
    assert!(node.connects.lock().unwrap().is_empty());
    assert!(capture.text().contains("already hosting"));
}

#[tokio::test]
async fn test_reachable_peer_gets_welcome_banner() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = PeerId::random();
    let target = parse_peer_address(&format!("/ip4/127.0.0.1/tcp/{port}/p2p/{peer}")).unwrap();

    let node = MockNode::new();
    let (console, capture) = console();
    let outcome = join(&node, &console, &target, PROBE).await.unwrap();

    assert_eq!(outcome, JoinOutcome::Connected);
    assert_eq!(node.connects.lock().unwrap().as_slice(), [target.multiaddr().clone()]);
    let text = capture.text();
    assert!(text.contains("Successfully connected"));
    assert!(text.contains(&node.local_peer_id().to_string()));
    assert!(!text.contains("firewall"));
}

#[tokio::test]
async fn test_unreachable_peer_is_still_dialed() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let target =
        parse_peer_address(&format!("/ip4/127.0.0.1/tcp/{port}/p2p/{}", PeerId::random())).unwrap();

    let node = MockNode::new();
    let (console, capture) = console();
    join(&node, &console, &target, PROBE).await.unwrap();

    assert_eq!(node.connects.lock().unwrap().len(), 1);
    assert!(capture.text().contains("firewall"));
}

#[tokio::test]
async fn test_connect_failure_is_fatal() {
    let target = parse_peer_address(&format!(
        "/ip4/127.0.0.1/udp/9/quic-v1/p2p/{}",
        PeerId::random()
    ))
    .unwrap();

    let node = MockNode::new();
    node.fail_connect("connection refused");
    let (console, _capture) = console();

    let err = join(&node, &console, &target, PROBE).await.unwrap_err();
    assert!(matches!(err, CliError::Core(BlackboxError::Connect { .. })));
}

#[tokio::test]
async fn test_report_groups_addresses() {
    let node = MockNode::new().with_addresses(&[
        "/ip4/127.0.0.1/tcp/4001",
        "/ip4/192.168.1.20/tcp/4001",
        "/ip4/203.0.113.7/tcp/4001",
    ]);
    let (console, capture) = console();

    report_own_addresses(&node, &console).await.unwrap();

    let text = capture.text();
    let id = node.local_peer_id();
    assert!(text.contains(&format!("Node ID: {id}")));
    assert!(text.contains(&format!("/ip4/192.168.1.20/tcp/4001/p2p/{id}")));
    let other = text.find("Other:").unwrap();
    let lan = text.find("LAN").unwrap();
    let loopback = text.find("Loopback").unwrap();
    assert!(other < lan && lan < loopback);
}

#[tokio::test]
async fn test_relay_address_is_picked_up_while_polling() {
    let node = std::sync::Arc::new(MockNode::new().with_addresses(&["/ip4/127.0.0.1/tcp/4001"]));
    let (console, capture) = console();
    let relay: Multiaddr = format!("/ip4/198.51.100.1/tcp/4001/p2p/{}/p2p-circuit", PeerId::random())
        .parse()
        .unwrap();

    let late = node.clone();
    let circuit = relay.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        late.set_addresses(vec![circuit]);
    });

    let found = wait_for_relay_address(
        node.as_ref(),
        &console,
        Duration::from_secs(5),
        Duration::from_millis(20),
    )
    .await
    .unwrap();

    let expected = format!("{relay}/p2p/{}", node.local_peer_id());
    assert_eq!(found.map(|a| a.to_string()), Some(expected.clone()));
    assert!(capture.text().contains(&expected));
}

#[tokio::test]
async fn test_relay_wait_times_out_with_hint() {
    let node = MockNode::new().with_addresses(&["/ip4/127.0.0.1/tcp/4001"]);
    let (console, capture) = console();

    let found = wait_for_relay_address(
        &node,
        &console,
        Duration::from_millis(100),
        Duration::from_millis(30),
    )
    .await
    .unwrap();

    assert_eq!(found, None);
    assert!(capture.text().contains("No relay address yet"));
}
