//! End-to-end tests of the `/ws/panel` transport.
//!
//! Each test starts the real server on an ephemeral port and connects a
//! `tokio-tungstenite` client to it.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use panel_core::{ChangeSink, PanelConfig, SyncPipeline};
use panel_observer::{AppState, BroadcastHub, RunningObserver, ServerConfig, spawn_observer};
use panel_types::{Field, FieldValue, PanelState};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Bridge {
    observer: RunningObserver,
    hub: Arc<BroadcastHub>,
    pipeline: SyncPipeline,
}

async fn start() -> Bridge {
    let hub = Arc::new(BroadcastHub::default());
    let state = Arc::new(AppState::from_config(
        &PanelConfig::default(),
        Arc::clone(&hub),
    ));
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let observer = spawn_observer(&config, state).await.unwrap();
    let pipeline = SyncPipeline::new(
        PanelState::default(),
        Arc::clone(&hub) as Arc<dyn ChangeSink>,
    );
    Bridge {
        observer,
        hub,
        pipeline,
    }
}

async fn connect(bridge: &Bridge) -> Client {
    let url = format!("ws://{}/ws/panel", bridge.observer.addr);
    let (client, _response) = tokio_tungstenite::connect_async(url).await.unwrap();
    client
}

async fn wait_for_viewers(hub: &BroadcastHub, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.viewer_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

async fn next_message(client: &mut Client) -> Message {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
}

fn as_json(message: &Message) -> Value {
    assert!(message.is_text(), "expected a text frame, got {message:?}");
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn connected_viewer_receives_text_frames() {
    let bridge = start().await;
    let mut client = connect(&bridge).await;
    wait_for_viewers(&bridge.hub, 1).await;

    bridge
        .pipeline
        .mutate(Field::Accelerator, FieldValue::Analog(512))
        .unwrap();
    assert_eq!(
        as_json(&next_message(&mut client).await),
        json!({"channel": "state", "accelerator": 512, "brake": 0})
    );

    bridge
        .pipeline
        .mutate(Field::Drs, FieldValue::Digital(true))
        .unwrap();
    assert_eq!(
        as_json(&next_message(&mut client).await),
        json!({"channel": "alert", "drs": true, "rollBar": false, "glv": false})
    );

    bridge.observer.handle.abort();
}

#[tokio::test]
async fn close_frame_removes_the_viewer() {
    let bridge = start().await;
    let mut client = connect(&bridge).await;
    let _other = connect(&bridge).await;
    wait_for_viewers(&bridge.hub, 2).await;

    client.close(None).await.unwrap();
    wait_for_viewers(&bridge.hub, 1).await;

    bridge.observer.handle.abort();
}

#[tokio::test]
async fn dropped_connection_removes_the_viewer() {
    let bridge = start().await;
    let client = connect(&bridge).await;
    wait_for_viewers(&bridge.hub, 1).await;

    drop(client);
    wait_for_viewers(&bridge.hub, 0).await;

    bridge.observer.handle.abort();
}

#[tokio::test]
async fn ping_gets_exactly_one_pong() {
    let bridge = start().await;
    let mut client = connect(&bridge).await;
    wait_for_viewers(&bridge.hub, 1).await;

    client
        .send(Message::Ping(b"hb".to_vec().into()))
        .await
        .unwrap();
    let pong = next_message(&mut client).await;
    assert!(
        matches!(&pong, Message::Pong(payload) if payload.as_ref() == b"hb"),
        "expected a pong, got {pong:?}"
    );

    // The next frame must be the change, not a second pong.
    bridge
        .pipeline
        .mutate(Field::Brake, FieldValue::Analog(100))
        .unwrap();
    assert_eq!(
        as_json(&next_message(&mut client).await),
        json!({"channel": "state", "accelerator": 0, "brake": 100})
    );

    bridge.observer.handle.abort();
}

#[tokio::test]
async fn client_text_frames_are_ignored() {
    let bridge = start().await;
    let mut client = connect(&bridge).await;
    wait_for_viewers(&bridge.hub, 1).await;

    client
        .send(Message::Text(String::from("hello").into()))
        .await
        .unwrap();
    bridge
        .pipeline
        .mutate(Field::Glv, FieldValue::Digital(true))
        .unwrap();

    assert_eq!(
        as_json(&next_message(&mut client).await),
        json!({"channel": "alert", "drs": false, "rollBar": false, "glv": true})
    );
    assert_eq!(bridge.hub.viewer_count(), 1);

    bridge.observer.handle.abort();
}
