use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const TOKEN: &str = "test-token";
const BROKEN_TOKEN: &str = "broken-upstream";

#[derive(Debug, Deserialize)]
struct GroupResponse {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct StudentCounts {
    student: String,
    annotations: u64,
    replies: u64,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    student: String,
    counts: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct DailyMatrix {
    days: Vec<String>,
    rows: Vec<DailyRow>,
}

#[derive(Debug, Deserialize)]
struct ReportResponse {
    group: String,
    window_start: String,
    window_end: String,
    fetch_error: Option<String>,
    total_records: usize,
    skipped: usize,
    counts: Vec<StudentCounts>,
    daily: DailyMatrix,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static UPSTREAM: Lazy<String> = Lazy::new(spawn_upstream);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn authorized(headers: &HeaderMap) -> bool {
    bearer(headers) == Some(TOKEN)
}

async fn mock_groups(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if bearer(&headers) == Some(BROKEN_TOKEN) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!([
        { "id": "grp1", "name": "Reading Circle", "public": false },
        { "id": "__world__", "name": "Public" }
    ])))
}

async fn mock_search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let single_page = params.get("limit").map(String::as_str) == Some("200")
        && params.contains_key("search_after")
        && params.contains_key("search_before");
    if !single_page {
        return Err(StatusCode::BAD_REQUEST);
    }
    if params.get("group").map(String::as_str) != Some("grp1") {
        return Ok(Json(json!({ "total": 0, "rows": [] })));
    }
    Ok(Json(json!({
        "total": 5,
        "rows": [
            { "id": "a1", "user": "acct:alice@hypothes.is", "created": "2024-01-02T10:00:00.000000+00:00" },
            { "id": "a2", "user": "acct:alice@hypothes.is", "created": "2024-01-02T11:00:00+00:00", "references": ["a1"] },
            { "id": "a3", "user": "acct:bob@hypothes.is", "created": "2024-01-03T09:00:00Z", "references": [] },
            { "id": "a4", "user": "acct:mallory@hypothes.is", "created": "sometime last week" },
            { "id": "a5", "user": "acct:carol@hypothes.is", "created": 1704189600 }
        ]
    })))
}

fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream port");
    listener.set_nonblocking(true).expect("nonblocking upstream");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("upstream runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("upstream listener");
            let app = Router::new()
                .route("/api/profile/groups", get(mock_groups))
                .route("/api/search", get(mock_search));
            axum::serve(listener, app).await.expect("upstream server");
        });
    });

    format!("http://{addr}/api")
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/healthz")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_annotation_dashboard"))
        .env("PORT", port.to_string())
        .env("HYPOTHESIS_API_URL", UPSTREAM.as_str())
        .env("HYPOTHESIS_TIMEOUT_SECS", "5")
        .env_remove("HYPOTHESIS_API_TOKEN")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_index_serves_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let body = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Student Posts Dashboard"));
    assert!(body.contains("const serverKey = false;"));
}

#[tokio::test]
async fn http_groups_lists_groups_for_key() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let groups: Vec<GroupResponse> = Client::new()
        .get(format!("{}/api/groups", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, "grp1");
    assert_eq!(groups[0].name, "Reading Circle");
}

#[tokio::test]
async fn http_groups_requires_key() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let missing = client
        .get(format!("{}/api/groups", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::UNAUTHORIZED);

    let rejected = client
        .get(format!("{}/api/groups", server.base_url))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_groups_upstream_failure_is_bad_gateway() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/api/groups", server.base_url))
        .bearer_auth(BROKEN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body = response.text().await.unwrap();
    assert!(body.contains("500"));
}

#[tokio::test]
async fn http_report_aggregates_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let report: ReportResponse = Client::new()
        .get(format!("{}/api/report", server.base_url))
        .query(&[("group", "grp1")])
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(report.group, "grp1");
    assert!(report.fetch_error.is_none());
    assert!(report.window_start < report.window_end);
    assert_eq!(report.total_records, 3);
    assert_eq!(report.skipped, 2);

    let counts: Vec<(&str, u64, u64)> = report
        .counts
        .iter()
        .map(|row| (row.student.as_str(), row.annotations, row.replies))
        .collect();
    assert_eq!(counts, vec![("alice", 1, 1), ("bob", 1, 0)]);

    assert_eq!(report.daily.days, vec!["01/02", "01/03"]);
    assert_eq!(report.daily.rows[0].student, "alice");
    assert_eq!(report.daily.rows[0].counts, vec![2, 0]);
    assert_eq!(report.daily.rows[1].student, "bob");
    assert_eq!(report.daily.rows[1].counts, vec![0, 1]);
}

#[tokio::test]
async fn http_report_with_rejected_key_is_empty() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/api/report", server.base_url))
        .query(&[("group", "grp1")])
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let report: ReportResponse = response.json().await.unwrap();
    assert!(report.fetch_error.is_some());
    assert_eq!(report.total_records, 0);
    assert!(report.counts.is_empty());
    assert!(report.daily.days.is_empty());
    assert!(report.daily.rows.is_empty());
}

#[tokio::test]
async fn http_report_for_quiet_group_is_empty() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let report: ReportResponse = Client::new()
        .get(format!("{}/api/report", server.base_url))
        .query(&[("group", "__world__")])
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(report.fetch_error.is_none());
    assert_eq!(report.total_records, 0);
    assert!(report.counts.is_empty());
    assert!(report.daily.rows.is_empty());
}

#[tokio::test]
async fn http_report_requires_group() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/api/report", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}
