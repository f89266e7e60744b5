//! End-to-end REST tests against an in-memory gateway bound to an
//! ephemeral port.

#![allow(clippy::panic, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use rental_gateway::api;
use rental_gateway::app_state::AppState;
use rental_gateway::config::GatewayConfig;

async fn spawn_app() -> String {
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
    format!("http://{addr}")
}

async fn send(req: reqwest::RequestBuilder) -> (StatusCode, Value) {
    let Ok(resp) = req.send().await else {
        panic!("request failed");
    };
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_room(client: &Client, base: &str, host: &str) -> String {
    let (status, body) = send(
        client
            .post(format!("{base}/api/v1/rooms"))
            .header("x-user-id", host)
            .json(&json!({
                "title": "Sunny studio near the river",
                "image": "https://img.example/studio.jpg",
                "price": 4_500_000,
                "address": "12 Nguyen Hue, District 1",
                "room_type": "private",
                "area": 28.5,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let Some(id) = body["id"].as_str() else {
        panic!("room id missing: {body}");
    };
    id.to_string()
}

async fn book(client: &Client, base: &str, tenant: &str, body: Value) -> (StatusCode, Value) {
    send(
        client
            .post(format!("{base}/api/v1/appointments"))
            .header("x-user-id", tenant)
            .json(&body),
    )
    .await
}

async fn transition(
    client: &Client,
    base: &str,
    actor: &str,
    id: &str,
    body: Value,
) -> (StatusCode, Value) {
    send(
        client
            .post(format!("{base}/api/v1/appointments/{id}/transition"))
            .header("x-user-id", actor)
            .json(&body),
    )
    .await
}

fn tenant_info() -> Value {
    json!({ "full_name": "Tran Thi B", "phone_number": "0901234567" })
}

#[tokio::test]
async fn health_is_public() {
    let base = spawn_app().await;
    let (status, body) = send(Client::new().get(format!("{base}/health"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let base = spawn_app().await;
    let (status, body) = send(Client::new().get(format!("{base}/api/v1/appointments"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 2202);
}

#[tokio::test]
async fn deposit_booking_runs_to_contract() {
    let base = spawn_app().await;
    let client = Client::new();
    let room_id = create_room(&client, &base, "host-1").await;

    let (status, created) = book(
        &client,
        &base,
        "tenant-1",
        json!({
            "room_id": room_id,
            "tenant_info": tenant_info(),
            "type": "DEPOSIT",
            "start_date": "2026-11-01",
            "end_date": "2027-11-01",
            "deposit_amount": 2_000_000,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["host_id"], "host-1");
    let Some(id) = created["id"].as_str() else {
        panic!("appointment id missing");
    };

    // Only the host approves.
    let (status, _) = transition(
        &client,
        &base,
        "tenant-1",
        id,
        json!({ "status": "waiting_deposit" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = transition(
        &client,
        &base,
        "host-1",
        id,
        json!({ "status": "waiting_deposit" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["applied"], true);
    assert_eq!(body["appointment"]["status"], "waiting_deposit");
    assert_eq!(body["appointment"]["deposit_status"], "unpaid");

    let (status, qr) = send(
        client
            .get(format!("{base}/api/v1/appointments/{id}/deposit-qr"))
            .header("x-user-id", "tenant-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{qr}");
    assert_eq!(qr["amount"], 2_000_000);

    // Paying needs a receipt.
    let (status, _) =
        transition(&client, &base, "tenant-1", id, json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = transition(
        &client,
        &base,
        "tenant-1",
        id,
        json!({ "status": "confirmed", "bill_image": "https://img.example/bill.jpg" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["appointment"]["bill_image"], "https://img.example/bill.jpg");

    let (status, body) =
        transition(&client, &base, "host-1", id, json!({ "status": "contracted" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["appointment"]["status"], "contracted");
    assert_eq!(body["appointment"]["deposit_status"], "paid");
    assert_eq!(body["next_statuses"], json!([]));

    // Terminal records refuse every edge.
    let (status, body) =
        transition(&client, &base, "tenant-1", id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2101);
}

#[tokio::test]
async fn view_booking_resend_is_a_no_op() {
    let base = spawn_app().await;
    let client = Client::new();
    let room_id = create_room(&client, &base, "host-2").await;

    let (status, created) = book(
        &client,
        &base,
        "tenant-2",
        json!({ "room_id": room_id, "tenant_info": tenant_info(), "type": "VIEW" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert!(created.get("deposit_amount").is_none());
    let Some(id) = created["id"].as_str() else {
        panic!("appointment id missing");
    };

    // A pending booking can only be rejected by the host.
    let (status, _) =
        transition(&client, &base, "tenant-2", id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        transition(&client, &base, "host-2", id, json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["applied"], true);

    let (status, body) =
        transition(&client, &base, "tenant-2", id, json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["applied"], false);
    assert_eq!(body["appointment"]["status"], "confirmed");

    let (status, _) =
        transition(&client, &base, "host-2", id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        transition(&client, &base, "host-2", id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn participants_only() {
    let base = spawn_app().await;
    let client = Client::new();
    let room_id = create_room(&client, &base, "host-3").await;

    // Hosts cannot book their own rooms.
    let (status, _) = book(
        &client,
        &base,
        "host-3",
        json!({ "room_id": room_id, "tenant_info": tenant_info(), "type": "VIEW" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, created) = book(
        &client,
        &base,
        "tenant-3",
        json!({ "room_id": room_id, "tenant_info": tenant_info(), "type": "VIEW" }),
    )
    .await;
    let Some(id) = created["id"].as_str() else {
        panic!("appointment id missing");
    };

    let (status, _) = send(
        client
            .get(format!("{base}/api/v1/appointments/{id}"))
            .header("x-user-id", "stranger"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        client
            .get(format!("{base}/api/v1/appointments?role=host"))
            .header("x-user-id", "host-3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send(
        client
            .get(format!("{base}/api/v1/appointments?role=tenant"))
            .header("x-user-id", "host-3"),
    )
    .await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn compare_set_is_capped() {
    let base = spawn_app().await;
    let client = Client::new();

    let mut last = Value::Null;
    for _ in 0..5 {
        let room = uuid::Uuid::new_v4();
        let (status, body) = send(
            client
                .post(format!("{base}/api/v1/me/preferences/compare/{room}"))
                .header("x-user-id", "shopper"),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        last = body;
    }
    assert_eq!(last["outcome"], "limit_reached");
    assert!(last["warning"].is_string());
    assert_eq!(last["room_ids"].as_array().map(Vec::len), Some(4));

    let (status, _) = send(
        client
            .get(format!("{base}/api/v1/me/preferences/wishlist"))
            .header("x-user-id", "shopper"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
