use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::{bulk_load::ProcessStatus, health::HealthStatus};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use loader_dashboard::client::{Client, ClientError, Gateway, UploadFile};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    path: String,
    query: HashMap<String, String>,
    body: Vec<u8>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, path: String, query: HashMap<String, String>, body: Vec<u8>) {
    log.lock().unwrap().push(Seen { path, query, body });
}

async fn process_clients(
    State(log): State<Log>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&log, format!("/processes/{id}/clients"), query, Vec::new());
    Json(json!({
        "content": [
            {"id": 1, "clientCode": "C-1", "idType": "C", "idNumber": "100",
             "firstNames": "Ana", "lastNames": "Ruiz", "processId": id},
            {"id": 2, "clientCode": "C-2", "idType": "P", "idNumber": "200",
             "firstNames": "Luis", "lastNames": "Mora", "processId": id}
        ],
        "totalElements": 18,
        "totalPages": 2,
        "size": 10,
        "number": 0,
        "empty": false
    }))
}

async fn process_errors(Path(_id): Path<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Process not found"})),
    )
}

async fn upload(
    State(log): State<Log>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Json<Value> {
    record(&log, "/bulk-load/clients".to_string(), query, body.to_vec());
    Json(json!({
        "processId": "abc-123",
        "status": "COMPLETED",
        "successCount": 18,
        "errorCount": 2
    }))
}

async fn client_by_code(Path(_code): Path<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "Client code is malformed", "errorCode": "E400"})),
    )
}

async fn processes() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>".to_string())
}

async fn process_status(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"processId": id, "status": "PROCESSING"}))
}

async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "DOWN",
            "service": "customer-loader-backend",
            "version": "1.0.0",
            "checks": {"database": "DOWN"}
        })),
    )
}

async fn slow_ready() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({"status": "READY"}))
}

async fn serve(timeout: Duration) -> (Client, Log) {
    let log: Log = Arc::default();
    let api = Router::new()
        .route("/processes", get(processes))
        .route("/processes/{id}/clients", get(process_clients))
        .route("/processes/{id}/errors", get(process_errors))
        .route("/processes/{id}/status", get(process_status))
        .route("/bulk-load/clients", post(upload))
        .route("/clients/code/{code}", get(client_by_code))
        .route("/health", get(health))
        .route("/health/ready", get(slow_ready))
        .with_state(log.clone());
    let router = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = Client::new(&format!("http://{addr}/api"), timeout).unwrap();
    (client, log)
}

#[tokio::test]
async fn process_clients_sends_page_and_size() {
    let (client, log) = serve(Duration::from_secs(5)).await;

    let page = client.process_clients("abc-123", 0, 10).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total_elements, 18);
    assert!(page.has_next());
    assert_eq!(page.content[0].full_name(), "Ana Ruiz");

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/processes/abc-123/clients");
    assert_eq!(seen[0].query.get("page").map(String::as_str), Some("0"));
    assert_eq!(seen[0].query.get("size").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn upload_posts_raw_body_with_file_name() {
    let (client, log) = serve(Duration::from_secs(5)).await;
    let file = UploadFile {
        name: "clients.txt".to_string(),
        bytes: b"C|100|Ana|Ruiz\n".to_vec(),
    };

    let response = client.upload_clients(&file).await.unwrap();
    assert_eq!(response.process_id, "abc-123");
    assert_eq!(response.success_count, 18);
    assert_eq!(response.error_count, 2);

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].path, "/bulk-load/clients");
    assert_eq!(
        seen[0].query.get("fileName").map(String::as_str),
        Some("clients.txt")
    );
    assert_eq!(seen[0].body, b"C|100|Ana|Ruiz\n".to_vec());
}

#[tokio::test]
async fn missing_process_lists_as_empty_page() {
    let (client, _log) = serve(Duration::from_secs(5)).await;

    let page = client.process_errors("nope", 3, 25).await.unwrap();
    assert!(page.is_empty());
    assert!(page.empty);
    assert_eq!(page.number, 3);
    assert_eq!(page.size, 25);
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let (client, _log) = serve(Duration::from_secs(5)).await;

    let err = client.client_by_code("C 1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Client code is malformed");

    let err = client.processes(0, 10).await.unwrap_err();
    assert_eq!(err.user_message(), "Internal server error, try again later.");
}

#[tokio::test]
async fn degraded_health_is_decoded_from_503() {
    let (client, _log) = serve(Duration::from_secs(5)).await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, HealthStatus::Down);
    assert_eq!(health.checks.get("database").map(String::as_str), Some("DOWN"));
}

#[tokio::test]
async fn status_endpoint_decodes_enum() {
    let (client, _log) = serve(Duration::from_secs(5)).await;

    let status = client.process_status("abc-123").await.unwrap();
    assert_eq!(status.status, ProcessStatus::Processing);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let (client, _log) = serve(Duration::from_millis(200)).await;

    let err = client.readiness().await.unwrap_err();
    assert_eq!(err, ClientError::Timeout);
    assert!(err.user_message().starts_with("Server unreachable"));
}
