//! Integration tests for the Podium server over real WebSockets.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use podium::prelude::*;
use podium_protocol::{ConnectionId, LobbyId, ServerEnvelope};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(config: LobbyConfig) -> String {
    let server = PodiumServerBuilder::new()
        .bind("127.0.0.1:0")
        .lobby_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_event(ws: &mut ClientWs, payload: serde_json::Value) {
    let frame = json!({ "payload": payload }).to_string();
    ws.send(Message::text(frame)).await.expect("send");
}

async fn recv_envelope(ws: &mut ClientWs) -> ServerEnvelope {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("ws error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("decode");
            }
            Message::Binary(bytes) => {
                return serde_json::from_slice(&bytes).expect("decode");
            }
            _ => continue,
        }
    }
}

async fn recv_event(ws: &mut ClientWs) -> ServerEvent {
    recv_envelope(ws).await.payload
}

/// Connects and joins, returning the socket and the assigned player id.
async fn join(addr: &str, name: &str) -> (ClientWs, ConnectionId) {
    let mut ws = connect(addr).await;
    send_event(&mut ws, json!({ "event": "join-game", "data": name })).await;
    match recv_event(&mut ws).await {
        ServerEvent::LobbyJoined { player_id, .. } => (ws, player_id),
        other => panic!("expected lobby-joined, got {other:?}"),
    }
}

/// Reads events until one matches, returning it.
async fn recv_until(
    ws: &mut ClientWs,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = recv_event(ws).await;
        if pred(&event) {
            return event;
        }
    }
}

async fn start(ws: &mut ClientWs) {
    send_event(ws, json!({ "event": "start-game", "data": 1 })).await;
}

async fn submit(ws: &mut ClientWs, value: i64) {
    send_event(
        ws,
        json!({
            "event": "submit-outcome",
            "data": { "lobbyId": 1, "outcomeValue": value }
        }),
    )
    .await;
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_flow_and_host_assignment() {
    let addr = start_server(LobbyConfig::default()).await;
    let mut a = connect(&addr).await;
    send_event(&mut a, json!({ "event": "join-game", "data": "Alice" })).await;

    let first = recv_envelope(&mut a).await;
    assert_eq!(first.seq, 1);
    let ServerEvent::LobbyJoined {
        lobby_id,
        player_id: alice,
        players,
    } = first.payload
    else {
        panic!("expected lobby-joined");
    };
    assert_eq!(lobby_id, LobbyId(1));
    assert_eq!(players.len(), 1);
    assert!(players[0].is_host);
    assert_eq!(players[0].id, alice);

    let update = recv_envelope(&mut a).await;
    assert_eq!(update.seq, 2);
    assert!(matches!(update.payload, ServerEvent::LobbyUpdate(_)));
    assert_eq!(recv_event(&mut a).await, ServerEvent::HostAssigned);

    let (mut b, bob) = join(&addr, "Bob").await;
    let ServerEvent::LobbyUpdate(players) = recv_event(&mut b).await else {
        panic!("expected lobby-update");
    };
    assert_eq!(players.len(), 2);
    assert_eq!(players[1].id, bob);
    assert!(!players[1].is_host);

    let ServerEvent::LobbyUpdate(players) = recv_event(&mut a).await else {
        panic!("expected lobby-update");
    };
    assert_eq!(players[1].name, "Bob");
}

#[tokio::test]
async fn test_notifications_are_text_frames() {
    let addr = start_server(LobbyConfig::default()).await;
    let mut ws = connect(&addr).await;
    send_event(&mut ws, json!({ "event": "join-game", "data": "Alice" })).await;

    let msg = ws.next().await.unwrap().unwrap();
    let Message::Text(text) = msg else {
        panic!("expected a text frame, got {msg:?}");
    };
    let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(value["payload"]["event"], "lobby-joined");
    assert_eq!(value["payload"]["data"]["lobbyId"], 1);
}

#[tokio::test]
async fn test_only_host_can_start() {
    let addr = start_server(LobbyConfig::default()).await;
    let (mut a, alice) = join(&addr, "Alice").await;
    let (mut b, _) = join(&addr, "Bob").await;

    start(&mut b).await;
    let event = recv_until(&mut b, |e| matches!(e, ServerEvent::Error(_))).await;
    assert_eq!(
        event,
        ServerEvent::Error(
            "Unable to start the game: only the host can start the game".into()
        )
    );

    start(&mut a).await;
    recv_until(&mut a, |e| matches!(e, ServerEvent::GameStarting)).await;
    assert_eq!(
        recv_event(&mut a).await,
        ServerEvent::GameStart {
            current_player: alice
        }
    );
}

#[tokio::test]
async fn test_full_match_ends_with_winner() {
    let config = LobbyConfig {
        round_limit: 2,
        ..LobbyConfig::default()
    };
    let addr = start_server(config).await;
    let (mut a, _) = join(&addr, "Alice").await;
    let (mut b, bob) = join(&addr, "Bob").await;

    start(&mut a).await;
    recv_until(&mut b, |e| matches!(e, ServerEvent::GameStart { .. })).await;

    submit(&mut a, 4).await;
    recv_until(&mut b, |e| matches!(e, ServerEvent::NextTurn { .. })).await;
    submit(&mut b, 10).await;
    let event = recv_until(&mut a, |e| matches!(e, ServerEvent::NextTurn { round: 2, .. })).await;
    let ServerEvent::NextTurn { scores, .. } = event else {
        unreachable!();
    };
    assert_eq!(scores[0].score, 4);
    assert_eq!(scores[1].score, 10);

    submit(&mut a, 6).await;
    recv_until(&mut b, |e| {
        matches!(e, ServerEvent::NextTurn { current_player, round: 2, .. } if *current_player == bob)
    })
    .await;
    submit(&mut b, 1).await;

    let over = recv_until(&mut a, |e| matches!(e, ServerEvent::GameOver { .. })).await;
    let ServerEvent::GameOver { winner, scores } = over else {
        unreachable!();
    };
    assert_eq!(winner.id, bob);
    assert_eq!(winner.name, "Bob");
    assert_eq!(scores.iter().map(|s| s.score).collect::<Vec<_>>(), vec![10, 11]);
}

#[tokio::test]
async fn test_out_of_turn_submit_rejected() {
    let addr = start_server(LobbyConfig::default()).await;
    let (mut a, _) = join(&addr, "Alice").await;
    let (mut b, _) = join(&addr, "Bob").await;
    start(&mut a).await;
    recv_until(&mut b, |e| matches!(e, ServerEvent::GameStart { .. })).await;

    submit(&mut b, 10).await;
    assert_eq!(
        recv_event(&mut b).await,
        ServerEvent::Error("It's not your turn".into())
    );
}

#[tokio::test]
async fn test_disconnect_mid_match_ends_it() {
    let addr = start_server(LobbyConfig::default()).await;
    let (mut a, _) = join(&addr, "Alice").await;
    let (mut b, bob) = join(&addr, "Bob").await;
    start(&mut a).await;
    recv_until(&mut b, |e| matches!(e, ServerEvent::GameStart { .. })).await;

    a.close(None).await.expect("close");
    drop(a);

    assert_eq!(recv_event(&mut b).await, ServerEvent::HostAssigned);
    let over = recv_until(&mut b, |e| matches!(e, ServerEvent::GameOver { .. })).await;
    let ServerEvent::GameOver { winner, .. } = over else {
        unreachable!();
    };
    assert_eq!(winner.id, bob);
}

#[tokio::test]
async fn test_malformed_payload_is_reported_and_harmless() {
    let addr = start_server(LobbyConfig::default()).await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("{not json".to_string())).await.unwrap();
    let ServerEvent::Error(message) = recv_event(&mut ws).await else {
        panic!("expected error");
    };
    assert!(message.starts_with("invalid message"), "{message}");

    send_event(&mut ws, json!({ "event": "join-game", "data": "   " })).await;
    let ServerEvent::Error(message) = recv_event(&mut ws).await else {
        panic!("expected error");
    };
    assert!(message.starts_with("invalid message"), "{message}");

    // The connection survives and can still join.
    send_event(&mut ws, json!({ "event": "join-game", "data": "Alice" })).await;
    assert!(matches!(
        recv_event(&mut ws).await,
        ServerEvent::LobbyJoined { .. }
    ));
}

#[tokio::test]
async fn test_double_join_rejected() {
    let addr = start_server(LobbyConfig::default()).await;
    let (mut a, _) = join(&addr, "Alice").await;
    send_event(&mut a, json!({ "event": "join-game", "data": "Alice" })).await;
    let event = recv_until(&mut a, |e| matches!(e, ServerEvent::Error(_))).await;
    assert_eq!(event, ServerEvent::Error("You are already in a lobby".into()));
}

#[tokio::test]
async fn test_idle_player_times_out() {
    let config = LobbyConfig {
        turn_timeout: Some(Duration::from_millis(200)),
        ..LobbyConfig::default()
    };
    let addr = start_server(config).await;
    let (mut a, _) = join(&addr, "Alice").await;
    let (mut b, bob) = join(&addr, "Bob").await;
    start(&mut a).await;

    let event = recv_until(&mut a, |e| matches!(e, ServerEvent::Error(_))).await;
    assert_eq!(event, ServerEvent::Error("turn timed out".into()));

    let over = recv_until(&mut b, |e| matches!(e, ServerEvent::GameOver { .. })).await;
    let ServerEvent::GameOver { winner, .. } = over else {
        unreachable!();
    };
    assert_eq!(winner.id, bob);
}

#[tokio::test]
async fn test_silent_socket_does_not_stall_other_players() {
    let addr = start_server(LobbyConfig::default()).await;
    let _silent = tokio::net::TcpStream::connect(&addr).await.expect("tcp connect");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (mut ws, _) = tokio::time::timeout(Duration::from_secs(3), join(&addr, "Alice"))
        .await
        .expect("a silent socket must not block new players");
    assert!(matches!(recv_event(&mut ws).await, ServerEvent::LobbyUpdate(_)));
}
