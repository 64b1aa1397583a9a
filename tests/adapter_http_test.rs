//! End-to-end tests of the adapter over HTTP against a mock ServiceNow
//! Table API.

use pretty_assertions::assert_eq;
use serde_json::json;
use snowgate::{Adapter, AdapterConfig, AdapterError, AdapterStatus, StatusEvent};
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/api/now/table/change_request";

fn config_for(server: &MockServer) -> AdapterConfig {
    AdapterConfig::new(server.uri(), "admin", "3ncryptM3", "change_request").unwrap()
}

fn adapter_for(server: &MockServer) -> Adapter {
    Adapter::new("123", &config_for(server)).unwrap()
}

fn change_request(number: &str, sys_id: &str) -> serde_json::Value {
    json!({
        "number": number,
        "active": "true",
        "priority": "4",
        "description": format!("Change {}", number),
        "work_start": "2026-10-18 08:00:00",
        "work_end": "2026-10-18 10:00:00",
        "sys_id": sys_id,
        "approval": "requested",
        "sys_class_name": "change_request"
    })
}

#[tokio::test]
async fn get_sends_limited_authenticated_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("sysparm_limit", "1"))
        .and(basic_auth("admin", "3ncryptM3"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": [change_request("CHG0000001", "a1")] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let serialized = adapter_for(&server).get_record().await.unwrap();
    let tickets: serde_json::Value = serde_json::from_str(&serialized).unwrap();

    assert_eq!(
        tickets,
        json!([{
            "change_ticket_number": "CHG0000001",
            "active": "true",
            "priority": "4",
            "description": "Change CHG0000001",
            "work_start": "2026-10-18 08:00:00",
            "work_end": "2026-10-18 10:00:00",
            "change_ticket_key": "a1"
        }])
    );
}

#[tokio::test]
async fn get_preserves_result_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                change_request("CHG3", "c"),
                change_request("CHG1", "a"),
                change_request("CHG2", "b")
            ]
        })))
        .mount(&server)
        .await;

    let tickets = adapter_for(&server).get_tickets().await.unwrap();
    let keys: Vec<_> = tickets.iter().filter_map(|t| t.key()).collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn post_creates_and_maps_single_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(basic_auth("admin", "3ncryptM3"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "result": change_request("CHG0030042", "new1") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ticket = adapter_for(&server).post_record().await.unwrap();
    assert_eq!(ticket.number(), Some("CHG0030042"));
    assert_eq!(ticket.key(), Some("new1"));
    assert_eq!(ticket.description, json!("Change CHG0030042"));
}

#[tokio::test]
async fn connect_emits_online() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let mut events = adapter.subscribe();
    adapter.connect().await;

    assert_eq!(
        events.recv().await.unwrap(),
        StatusEvent::new(AdapterStatus::Online, "123")
    );
}

#[tokio::test]
async fn unauthorized_emits_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "User Not Authenticated" },
            "status": "failure"
        })))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let mut events = adapter.subscribe();

    assert!(matches!(
        adapter.get_record().await,
        Err(AdapterError::Authentication)
    ));
    assert_eq!(adapter.healthcheck().await, AdapterStatus::Offline);
    assert_eq!(
        events.recv().await.unwrap(),
        StatusEvent::new(AdapterStatus::Offline, "123")
    );
}

#[tokio::test]
async fn hibernating_instance_is_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Instance Hibernating page</title></head><body></body></html>",
        ))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    assert!(matches!(
        adapter.get_record().await,
        Err(AdapterError::Hibernating)
    ));
    assert_eq!(adapter.healthcheck().await, AdapterStatus::Offline);
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    match adapter_for(&server).post_record().await {
        Err(AdapterError::HttpStatus { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn slow_instance_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let adapter = Adapter::new("123", &config).unwrap();

    assert!(matches!(
        adapter.get_record().await,
        Err(AdapterError::Timeout { .. })
    ));
}

#[tokio::test]
async fn unreachable_instance_is_offline() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let adapter = Adapter::new("123", &config).unwrap();
    let mut events = adapter.subscribe();
    adapter.connect().await;

    assert_eq!(events.recv().await.unwrap().status, AdapterStatus::Offline);
}

#[tokio::test]
async fn stalled_body_times_out() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        // Headers promise a body that never finishes arriving.
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n{\"result\":",
            )
            .await;
        let _ = socket.flush().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let config = AdapterConfig::new(
        format!("http://{}", addr),
        "admin",
        "3ncryptM3",
        "change_request",
    )
    .unwrap()
    .with_timeout(Duration::from_millis(300));
    let adapter = Adapter::new("123", &config).unwrap();

    assert!(matches!(
        adapter.get_record().await,
        Err(AdapterError::Timeout { .. })
    ));
}
