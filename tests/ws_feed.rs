//! WebSocket feed tests: participant list subscription and single-record
//! watches against an in-memory gateway.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use rental_gateway::api;
use rental_gateway::app_state::AppState;
use rental_gateway::config::GatewayConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_app() -> std::net::SocketAddr {
    let config = GatewayConfig::default();
    let app = api::build_app(AppState::in_memory(&config), &config);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: std::net::SocketAddr, user: &'static str) -> WsStream {
    let Ok(mut request) = format!("ws://{addr}/ws").into_client_request() else {
        panic!("bad ws url");
    };
    request
        .headers_mut()
        .insert("x-user-id", HeaderValue::from_static(user));
    let Ok((ws, _)) = tokio_tungstenite::connect_async(request).await else {
        panic!("ws connect failed");
    };
    ws
}

async fn send_command(ws: &mut WsStream, id: &str, payload: Value) {
    let msg = json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    let Ok(()) = ws.send(Message::text(msg.to_string())).await else {
        panic!("ws send failed");
    };
}

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("no ws message within timeout");
        };
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap_or(Value::Null);
        }
    }
}

async fn create_room(client: &Client, addr: std::net::SocketAddr, host: &str) -> String {
    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1/rooms"))
        .header("x-user-id", host)
        .json(&json!({
            "title": "Loft above the market",
            "price": 3_200_000,
            "address": "7 Ben Thanh",
            "room_type": "entire",
            "area": 40.0,
        }))
        .send()
        .await
    else {
        panic!("create room failed");
    };
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    body["id"].as_str().map(str::to_string).unwrap_or_default()
}

async fn book_view(client: &Client, addr: std::net::SocketAddr, tenant: &str, room: &str) -> String {
    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1/appointments"))
        .header("x-user-id", tenant)
        .json(&json!({
            "room_id": room,
            "tenant_info": { "full_name": "Le Van C", "phone_number": "0912345678" },
            "type": "VIEW",
        }))
        .send()
        .await
    else {
        panic!("booking failed");
    };
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    body["id"].as_str().map(str::to_string).unwrap_or_default()
}

#[tokio::test]
async fn upgrade_requires_identity() {
    let addr = spawn_app().await;
    let result = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn subscriber_receives_list_after_booking() {
    let addr = spawn_app().await;
    let client = Client::new();
    let room = create_room(&client, addr, "host-ws").await;

    let mut ws = connect(addr, "tenant-ws").await;
    send_command(&mut ws, "sub-1", json!({ "command": "subscribe" })).await;

    let ack = next_json(&mut ws).await;
    assert_eq!(ack["type"], "response");
    assert_eq!(ack["id"], "sub-1");

    let initial = next_json(&mut ws).await;
    assert_eq!(initial["payload"]["event_type"], "appointments");
    assert_eq!(initial["payload"]["appointments"], json!([]));

    let id = book_view(&client, addr, "tenant-ws", &room).await;

    let pushed = next_json(&mut ws).await;
    assert_eq!(pushed["type"], "event");
    let Some(list) = pushed["payload"]["appointments"].as_array() else {
        panic!("expected appointment list: {pushed}");
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
}

#[tokio::test]
async fn watcher_receives_record_after_transition() {
    let addr = spawn_app().await;
    let client = Client::new();
    let room = create_room(&client, addr, "host-watch").await;
    let id = book_view(&client, addr, "tenant-watch", &room).await;

    let mut ws = connect(addr, "host-watch").await;
    send_command(
        &mut ws,
        "w-1",
        json!({ "command": "watch", "appointment_ids": [id] }),
    )
    .await;

    let ack = next_json(&mut ws).await;
    assert_eq!(ack["payload"]["count"], 1);
    let current = next_json(&mut ws).await;
    assert_eq!(current["payload"]["appointment"]["status"], "pending");

    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1/appointments/{id}/transition"))
        .header("x-user-id", "host-watch")
        .json(&json!({ "status": "confirmed" }))
        .send()
        .await
    else {
        panic!("transition failed");
    };
    assert!(resp.status().is_success());

    let pushed = next_json(&mut ws).await;
    assert_eq!(pushed["payload"]["event_type"], "appointment_updated");
    assert_eq!(pushed["payload"]["appointment"]["status"], "confirmed");
}
