use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use api_types::{
    bulk_load::{
        BulkLoadError, BulkLoadProcess, BulkLoadResponse, BulkLoadStatistics, ProcessDetails,
        ProcessStatusView,
    },
    client::{Account, ClientDetail, PayrollPayment},
    health::{HealthResponse, ProbeResponse},
    page::PaginatedResponse,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use loader_dashboard::{
    app::{App, Dialog, Screen},
    client::{ClientError, ClientResult, Gateway, UploadFile},
    config::AppConfig,
    routes::Route,
};
use serde_json::json;

#[derive(Clone, Default)]
struct FakeBackend {
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn client_row(n: u64, process_id: &str) -> ClientDetail {
    serde_json::from_value(json!({
        "id": n,
        "clientCode": format!("C-{n}"),
        "idType": "C",
        "idNumber": format!("{}", 1000 + n),
        "firstNames": format!("Name{n}"),
        "lastNames": "Test",
        "processId": process_id
    }))
    .unwrap()
}

fn not_found<T>() -> ClientResult<T> {
    Err(ClientError::Status {
        status: 404,
        message: None,
    })
}

impl Gateway for FakeBackend {
    async fn upload_clients(&self, file: &UploadFile) -> ClientResult<BulkLoadResponse> {
        self.record(format!("upload {} {}", file.name, file.bytes.len()));
        Ok(serde_json::from_value(json!({
            "processId": "abc-123",
            "status": "COMPLETED",
            "successCount": 18,
            "errorCount": 2
        }))
        .unwrap())
    }

    async fn statistics(&self, process_id: &str) -> ClientResult<BulkLoadStatistics> {
        self.record(format!("statistics {process_id}"));
        not_found()
    }

    async fn all_clients(
        &self,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<ClientDetail>> {
        self.record(format!("all_clients {page} {size}"));
        Ok(PaginatedResponse::empty(page, size))
    }

    async fn process_clients(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<ClientDetail>> {
        self.record(format!("process_clients {process_id} {page} {size}"));
        let total = 18u64;
        let start = u64::from(page * size);
        let end = (start + u64::from(size)).min(total);
        let content = (start..end).map(|n| client_row(n + 1, process_id)).collect();
        Ok(PaginatedResponse {
            content,
            total_elements: total,
            total_pages: total.div_ceil(u64::from(size)) as u32,
            size,
            number: page,
            empty: false,
        }
        .normalized())
    }

    async fn client_by_id(&self, id: i64) -> ClientResult<ClientDetail> {
        self.record(format!("client_by_id {id}"));
        not_found()
    }

    async fn client_by_code(&self, code: &str) -> ClientResult<ClientDetail> {
        self.record(format!("client_by_code {code}"));
        not_found()
    }

    async fn account_by_client(&self, client_id: i64) -> ClientResult<Account> {
        self.record(format!("account_by_client {client_id}"));
        not_found()
    }

    async fn first_payment(&self, account_id: i64) -> ClientResult<PayrollPayment> {
        self.record(format!("first_payment {account_id}"));
        not_found()
    }

    async fn processes(
        &self,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<BulkLoadProcess>> {
        self.record(format!("processes {page} {size}"));
        Ok(PaginatedResponse::empty(page, size))
    }

    async fn process_details(&self, process_id: &str) -> ClientResult<ProcessDetails> {
        self.record(format!("process_details {process_id}"));
        not_found()
    }

    async fn process_status(&self, process_id: &str) -> ClientResult<ProcessStatusView> {
        self.record(format!("process_status {process_id}"));
        not_found()
    }

    async fn process_errors(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<BulkLoadError>> {
        self.record(format!("process_errors {process_id} {page} {size}"));
        Ok(PaginatedResponse::empty(page, size))
    }

    async fn health(&self) -> ClientResult<HealthResponse> {
        self.record("health".to_string());
        Ok(HealthResponse::down("customer-loader-backend", "1.0.0"))
    }

    async fn readiness(&self) -> ClientResult<ProbeResponse> {
        self.record("readiness".to_string());
        Ok(ProbeResponse::degraded("READY"))
    }

    async fn liveness(&self) -> ClientResult<ProbeResponse> {
        self.record("liveness".to_string());
        Ok(ProbeResponse::degraded("ALIVE"))
    }
}

fn app(route: &str) -> (App<FakeBackend>, FakeBackend) {
    let backend = FakeBackend::default();
    let config = AppConfig {
        route: route.to_string(),
        ..AppConfig::default()
    };
    (App::new(config, backend.clone()), backend)
}

fn press(app: &mut App<FakeBackend>, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
}

fn type_text(app: &mut App<FakeBackend>, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

/// Feeds background results into the app until `done` holds.
async fn pump_until(app: &mut App<FakeBackend>, done: impl Fn(&App<FakeBackend>) -> bool) {
    let wait = async {
        while !done(app) {
            let Some(event) = app.next_event().await else {
                break;
            };
            app.handle_event(event, Instant::now());
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("condition not reached in time");
}

fn scratch_file(name: &str, len: usize) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("loader-dashboard-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, vec![b'x'; len]).unwrap();
    path
}

#[tokio::test]
async fn upload_then_browse_created_clients() {
    let (mut app, backend) = app("/dashboard");
    app.start(Instant::now());

    let path = scratch_file("clients.txt", 200);
    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, &path.to_string_lossy());
    press(&mut app, KeyCode::Enter);

    let Screen::Dashboard(dashboard) = &app.state().screen else {
        panic!("expected dashboard");
    };
    let selected = dashboard.upload.selected().expect("file picked");
    assert_eq!(selected.name, "clients.txt");
    assert_eq!(selected.size, 200);

    press(&mut app, KeyCode::Char('u'));
    pump_until(&mut app, |app| {
        matches!(&app.state().screen, Screen::Clients(list) if list.buffer().len() > 0)
    })
    .await;

    assert_eq!(app.state().route, Route::Clients(Some("abc-123".to_string())));
    let toast = app.state().toast.as_ref().expect("success toast");
    assert_eq!(toast.message, "18 clients created");

    let Screen::Clients(list) = &app.state().screen else {
        panic!("expected clients screen");
    };
    assert!(list.visible_len() <= 10);
    assert_eq!(list.buffer().total_elements, 18);

    let calls = backend.calls();
    assert!(calls.contains(&"upload clients.txt 200".to_string()), "{calls:?}");
    assert!(calls.contains(&"process_clients abc-123 0 10".to_string()), "{calls:?}");
}

#[tokio::test]
async fn next_page_replaces_the_buffer() {
    let (mut app, backend) = app("/dashboard/clients/abc-123");
    app.start(Instant::now());
    pump_until(&mut app, |app| {
        matches!(&app.state().screen, Screen::Clients(list) if list.buffer().len() == 10)
    })
    .await;

    press(&mut app, KeyCode::Char('n'));
    pump_until(&mut app, |app| {
        matches!(
            &app.state().screen,
            Screen::Clients(list) if list.page() == 1 && !list.is_loading()
        )
    })
    .await;

    let Screen::Clients(list) = &app.state().screen else {
        panic!("expected clients screen");
    };
    assert_eq!(list.buffer().len(), 8);
    assert_eq!(list.visible()[0].client_code, "C-11");
    assert!(backend.calls().contains(&"process_clients abc-123 1 10".to_string()));
}

#[tokio::test]
async fn missing_process_id_issues_no_request() {
    let (mut app, backend) = app("/dashboard/clients");
    app.start(Instant::now());
    pump_until(&mut app, |app| app.state().header_health.status().is_some()).await;

    let Screen::Clients(list) = &app.state().screen else {
        panic!("expected clients screen");
    };
    assert_eq!(list.error(), Some("Process id not provided."));
    assert!(!list.is_loading());
    assert!(
        !backend.calls().iter().any(|call| call.starts_with("process_clients")),
        "{:?}",
        backend.calls()
    );
}

#[tokio::test]
async fn non_txt_file_is_rejected_before_upload() {
    let (mut app, backend) = app("/dashboard");
    app.start(Instant::now());

    let path = scratch_file("clients.csv", 10);
    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, &path.to_string_lossy());
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('u'));

    let Screen::Dashboard(dashboard) = &app.state().screen else {
        panic!("expected dashboard");
    };
    assert!(dashboard.upload.selected().is_none());
    let notice = dashboard.upload.notice().expect("rejection notice");
    assert_eq!(notice.text, "Only .txt files are allowed.");
    assert!(!backend.calls().iter().any(|call| call.starts_with("upload")));
}

#[tokio::test]
async fn process_info_dialog_loads_both_sections() {
    let (mut app, backend) = app("/dashboard");
    app.start(Instant::now());

    app.open_dialog(Dialog::ProcessInfo(
        loader_dashboard::controllers::ProcessInfoController::new("abc-123"),
    ));
    pump_until(&mut app, |app| {
        matches!(app.state().dialogs.last(), Some(Dialog::ProcessInfo(info))
            if !info.clients().is_loading()
                && !info.errors().is_loading()
                && !info.details_loading())
    })
    .await;

    let Some(Dialog::ProcessInfo(info)) = app.state().dialogs.last() else {
        panic!("expected process info dialog");
    };
    assert_eq!(info.clients().buffer().len(), 5);
    assert_eq!(info.errors().buffer().len(), 0);
    assert!(info.details_error().is_some());

    let calls = backend.calls();
    assert!(calls.contains(&"process_clients abc-123 0 5".to_string()), "{calls:?}");
    assert!(calls.contains(&"process_errors abc-123 0 5".to_string()), "{calls:?}");

    press(&mut app, KeyCode::Esc);
    assert!(app.state().dialogs.is_empty());
}

#[tokio::test]
async fn find_client_by_id_opens_details() {
    let (mut app, backend) = app("/clientes");
    app.start(Instant::now());

    press(&mut app, KeyCode::Char('i'));
    type_text(&mut app, "abc");
    press(&mut app, KeyCode::Enter);
    assert!(app.state().dialogs.is_empty());
    let toast = app.state().toast.as_ref().expect("warning toast");
    assert_eq!(toast.message, "Client id must be a number.");

    press(&mut app, KeyCode::Char('i'));
    type_text(&mut app, "42");
    press(&mut app, KeyCode::Enter);
    pump_until(&mut app, |app| {
        matches!(app.state().dialogs.last(), Some(Dialog::ClientDetails(details))
            if !details.is_loading())
    })
    .await;

    let Some(Dialog::ClientDetails(details)) = app.state().dialogs.last() else {
        panic!("expected client details dialog");
    };
    assert_eq!(details.error(), Some("Resource not found."));
    assert!(backend.calls().contains(&"client_by_id 42".to_string()));
}
