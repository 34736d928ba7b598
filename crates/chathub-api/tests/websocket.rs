mod common;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chathub_core::types::UserId;

use common::TestApp;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{addr}")
}

async fn open(base: &str, app: &TestApp, user: UserId) -> Socket {
    let url = format!("{base}/ws?token={}", app.token(user));
    let (socket, _) = connect_async(url).await.unwrap();
    socket
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn wait_for<F: Fn() -> bool>(check: F) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_private_message_round_trip() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let base = serve(&app).await;

    let mut a = open(&base, &app, alice).await;
    let snapshot = next_json(&mut a).await;
    assert_eq!(snapshot["type"], "onlineUsers");
    let online = next_json(&mut a).await;
    assert_eq!(online["type"], "userStatusChange");
    assert_eq!(online["onlineUsers"][0]["userId"], alice.0);

    let mut b = open(&base, &app, bob).await;
    let snapshot = next_json(&mut b).await;
    assert_eq!(snapshot["onlineUsers"].as_array().unwrap().len(), 2);
    let _own = next_json(&mut b).await;

    let notice = next_json(&mut a).await;
    assert_eq!(notice["type"], "userStatusChange");
    assert_eq!(notice["onlineUsers"][0]["username"], "bob");
    assert_eq!(notice["onlineUsers"][0]["isOnline"], true);

    let outgoing = json!({
        "type": "private",
        "receiverId": bob.0,
        "message": "hello bob",
    });
    a.send(Message::text(outgoing.to_string())).await.unwrap();

    let delivered = next_json(&mut b).await;
    assert_eq!(delivered["type"], "private");
    assert_eq!(delivered["senderId"], alice.0);
    assert_eq!(delivered["senderUsername"], "alice");
    assert_eq!(delivered["message"], "hello bob");
    assert!(delivered["sentAt"].is_string());

    let mut stored = Vec::new();
    for _ in 0..50 {
        stored = app.chats.history(alice, bob).await.unwrap();
        if !stored.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message, "hello bob");
}

#[tokio::test]
async fn test_closing_socket_announces_offline() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let base = serve(&app).await;

    let mut a = open(&base, &app, alice).await;
    let _snapshot = next_json(&mut a).await;
    let _own = next_json(&mut a).await;

    let mut b = open(&base, &app, bob).await;
    let _snapshot = next_json(&mut b).await;
    let _own = next_json(&mut b).await;
    let _bob_online = next_json(&mut a).await;

    b.close(None).await.unwrap();

    let notice = next_json(&mut a).await;
    assert_eq!(notice["type"], "userStatusChange");
    assert_eq!(notice["onlineUsers"][0]["userId"], bob.0);
    assert_eq!(notice["onlineUsers"][0]["isOnline"], false);

    wait_for(|| app.state.realtime.connection_count() == 1).await;
    assert_eq!(app.state.realtime.online_count(), 1);
}

#[tokio::test]
async fn test_malformed_frame_gets_error_reply() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let base = serve(&app).await;

    let mut a = open(&base, &app, alice).await;
    let _snapshot = next_json(&mut a).await;
    let _own = next_json(&mut a).await;

    a.send(Message::text("{not json")).await.unwrap();
    let reply = next_json(&mut a).await;
    assert_eq!(reply["error"], "Invalid message format");

    a.send(Message::text(json!({"type": "private", "message": "x"}).to_string()))
        .await
        .unwrap();
    let reply = next_json(&mut a).await;
    assert_eq!(reply["error"], "Invalid user IDs provided");

    assert_eq!(app.state.realtime.connection_count(), 1);
}
