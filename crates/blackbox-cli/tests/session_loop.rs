//! Chat session behaviour against an in-memory node

mod common;

use std::sync::Arc;
use std::time::Duration;

use blackbox_cli::{ChatSession, SessionEnd};
use blackbox_core::{ChatNode, InboundMessage, Subscription};
use libp2p::PeerId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use common::{console, MockNode};

fn lines(input: &'static str) -> tokio::io::Lines<&'static [u8]> {
    input.as_bytes().lines()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_exit_is_not_published() {
    let node = Arc::new(MockNode::new());
    let (console, capture) = console();
    let (_tx, subscription) = Subscription::channel();

    let session = ChatSession::new(node.clone(), console, "alice");
    let end = session
        .run(subscription, lines("/help\n\n   \n/exit\nafter exit\n"), std::future::pending())
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Exit);
    assert!(node.published.lock().unwrap().is_empty());
    let text = capture.text();
    assert!(text.contains("Commands:"));
    assert!(text.contains("Goodbye"));
}

#[tokio::test]
async fn test_chat_lines_are_framed_and_echoed() {
    let node = Arc::new(MockNode::new());
    let (console, capture) = console();
    let (_tx, subscription) = Subscription::channel();

    let end = ChatSession::new(node.clone(), console, "alice")
        .run(subscription, lines("hello there\n/exit\n"), std::future::pending())
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Exit);
    assert_eq!(node.published_text(), ["[alice]:hello there"]);
    assert!(capture.text().contains("alice: hello there"));
}

#[tokio::test]
async fn test_publish_failure_keeps_session_alive() {
    let node = Arc::new(MockNode::new());
    node.fail_publishes(1);
    let (console, capture) = console();
    let (_tx, subscription) = Subscription::channel();

    let end = ChatSession::new(node.clone(), console, "alice")
        .run(subscription, lines("lost\nkept\n/exit\n"), std::future::pending())
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Exit);
    assert_eq!(node.published_text(), ["[alice]:kept"]);
    let text = capture.text();
    assert!(text.contains("message not sent"));
    assert!(!text.contains("alice: lost"));
}

#[tokio::test]
async fn test_own_messages_are_not_rendered() {
    let node = Arc::new(MockNode::new());
    let (console, capture) = console();
    let (tx, subscription) = Subscription::channel();
    let (mut input, reader) = tokio::io::duplex(256);

    tx.send(InboundMessage {
        origin: node.local_peer_id(),
        data: b"[alice]:my own echo".to_vec(),
    })
    .unwrap();
    tx.send(InboundMessage {
        origin: PeerId::random(),
        data: b"[bob]:hi alice".to_vec(),
    })
    .unwrap();
    tx.send(InboundMessage {
        origin: PeerId::random(),
        data: b"no frame here".to_vec(),
    })
    .unwrap();

    let session = ChatSession::new(node.clone(), console, "alice");
    let run = tokio::spawn(session.run(
        subscription,
        tokio::io::BufReader::new(reader).lines(),
        std::future::pending(),
    ));

    settle().await;
    input.write_all(b"/exit\n").await.unwrap();
    assert_eq!(run.await.unwrap().unwrap(), SessionEnd::Exit);

    let text = capture.text();
    assert!(text.contains("bob: hi alice"));
    assert!(text.contains("no frame here"));
    assert!(!text.contains("my own echo"));
}

#[tokio::test]
async fn test_closed_subscription_ends_session() {
    let node = Arc::new(MockNode::new());
    let (console, _capture) = console();
    let (tx, subscription) = Subscription::channel();
    let (_input, reader) = tokio::io::duplex(64);

    let session = ChatSession::new(node, console, "alice");
    let run = tokio::spawn(session.run(
        subscription,
        tokio::io::BufReader::new(reader).lines(),
        std::future::pending(),
    ));

    drop(tx);
    let end = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(end, SessionEnd::SubscriptionClosed);
}

#[tokio::test]
async fn test_end_of_input_waits_for_signal() {
    let node = Arc::new(MockNode::new());
    let (console, capture) = console();
    let (tx, subscription) = Subscription::channel();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let session = ChatSession::new(node, console, "alice");
    let run = tokio::spawn(session.run(subscription, lines(""), async move {
        let _ = stop_rx.await;
    }));

    settle().await;
    assert!(!run.is_finished());

    tx.send(InboundMessage {
        origin: PeerId::random(),
        data: b"[bob]:still here?".to_vec(),
    })
    .unwrap();
    settle().await;

    stop_tx.send(()).unwrap();
    assert_eq!(run.await.unwrap().unwrap(), SessionEnd::Interrupted);

    let text = capture.text();
    assert!(text.contains("bob: still here?"));
    assert!(text.contains("shutting down cleanly"));
}
