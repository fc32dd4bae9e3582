//! Session Round Trip Test
//!
//! Drives `SessionService` over a real WebSocket against a scripted game server
//! bound to a local port, checking the command sequence and the replay payload.
//!
//! Run with: cargo test --test session_roundtrip -- --nocapture

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use frenzy_angler::fish::{FailureReason, RangeTier, SessionResult};
use frenzy_angler::{SessionConfig, SessionService, WsConnector};

// ========== Scripted Server ==========

/// How the scripted server behaves after the handshake
#[derive(Clone, Copy)]
enum Script {
    /// Full game: initGame, 12 ticks, gameOver on the first `end`
    Catch,
    /// Close right after reading `prepare`
    CloseEarly,
}

async fn next_command(ws: &mut WebSocketStream<tokio::net::TcpStream>) -> Option<Value> {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                return Some(serde_json::from_str(&text).expect("client sent invalid JSON"))
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

async fn send_json(ws: &mut WebSocketStream<tokio::net::TcpStream>, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

/// Serve exactly one connection; resolves to every command the client sent
async fn spawn_server(script: Script) -> (String, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut received = Vec::new();

        let prepare = next_command(&mut ws).await.expect("no prepare");
        received.push(prepare);

        if let Script::CloseEarly = script {
            ws.close(None).await.ok();
            while ws.next().await.is_some() {}
            return received;
        }

        send_json(&mut ws, json!({"type": "initGame"})).await;
        let start = next_command(&mut ws).await.expect("no start");
        received.push(start);

        for i in 0..12 {
            send_json(&mut ws, json!({"type": "gameState", "frame": i * 2, "dir": (i % 3) - 1})).await;
        }

        let end = next_command(&mut ws).await.expect("no end");
        received.push(end);

        send_json(
            &mut ws,
            json!({
                "type": "gameOver",
                "success": true,
                "catchedFish": {
                    "fishInfo": {"fishName": "Goldfish", "quality": 2, "sellPrice": 12, "expGain": 30},
                    "currentExp": 130,
                    "expToNextLevel": 500,
                    "energy": 7,
                    "gold": 1012,
                    "fishPoint": 40
                }
            }),
        )
        .await;

        // anything after gameOver would be a duplicate end
        while let Some(extra) = next_command(&mut ws).await {
            received.push(extra);
        }
        received
    });

    (url, handle)
}

fn service(url: String) -> SessionService<WsConnector> {
    let config = SessionConfig {
        timeout: Duration::from_secs(10),
        ..SessionConfig::default()
    };
    SessionService::new(WsConnector::new(url), config)
}

// ========== Tests ==========

#[tokio::test]
async fn test_full_session_over_websocket() {
    let (url, server) = spawn_server(Script::Catch).await;

    let result = service(url).run("test-token", RangeTier::Long).await;

    let SessionResult::Success { reward: Some(reward) } = result else {
        panic!("expected a successful catch, got {:?}", result);
    };
    assert_eq!(reward.fish_name, "Goldfish");
    assert_eq!(reward.quality, 2);
    assert_eq!(reward.energy, 7);
    assert_eq!(reward.gold, 1012.0);

    let received = server.await.unwrap();
    let names: Vec<&str> = received.iter().map(|c| c["cmd"].as_str().unwrap()).collect();
    assert_eq!(names, ["prepare", "start", "end"]);

    assert_eq!(received[0]["range"], "long_range");
    assert_eq!(received[0]["is5x"], false);

    let end = &received[2];
    assert_eq!(end["en"], 1);
    assert_eq!(end["rep"]["fs"], 100);
    assert_eq!(end["rep"]["ns"], 200);
    assert_eq!(end["rep"]["fps"], 20);

    // 10 keyframes with 29 interpolated points between each pair
    let frs = end["rep"]["frs"].as_array().unwrap();
    assert_eq!(frs.len(), 1 + 9 * 30);
    assert_eq!(frs[0].as_array().unwrap().len(), 4);
    assert_eq!(frs[1].as_array().unwrap().len(), 2);
    assert_eq!(frs[30].as_array().unwrap().len(), 4);
    assert_eq!(frs[frs.len() - 1].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_server_closing_before_start() {
    let (url, server) = spawn_server(Script::CloseEarly).await;

    let result = service(url).run("test-token", RangeTier::Short).await;
    assert_eq!(
        result,
        SessionResult::Failure(FailureReason::ClosedBeforeStart)
    );

    let received = server.await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["cmd"], "prepare");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_failure() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = service(url).run("test-token", RangeTier::Mid).await;
    assert!(matches!(
        result,
        SessionResult::Failure(FailureReason::Transport(_))
    ));
}
