//! The HTTP client against an in-process service with the same endpoints.

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use stmtview_core::{BankStatement, DashboardState, Statistics, USER_ERROR_MESSAGE};
use stmtview_ingest::{
    AnalysisService, HttpAnalysisService, IngestError, Readiness, analyze_file, run_analysis,
};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

#[derive(Default)]
struct Seen {
    /// (field name, file name, content type, size)
    parts: Mutex<Vec<(String, String, String, usize)>>,
    statement_requests: AtomicU32,
}

async fn accept_upload(State(seen): State<Arc<Seen>>, mut multipart: Multipart) -> StatusCode {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        seen.parts.lock().unwrap().push((name, file_name, content_type, size));
    }
    StatusCode::OK
}

async fn statement(State(seen): State<Arc<Seen>>) -> impl IntoResponse {
    seen.statement_requests.fetch_add(1, Ordering::SeqCst);
    ([("content-type", "application/json")], fixture("bank_statement.json"))
}

async fn statistics() -> impl IntoResponse {
    ([("content-type", "application/json")], fixture("statistics.json"))
}

fn service_router(seen: Arc<Seen>) -> Router {
    Router::new()
        .route("/upload", post(accept_upload))
        .route("/load_bank_statement", get(statement))
        .route("/get_statistics", get(statistics))
        .with_state(seen)
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A small PDF-looking file; removed when the returned guard drops.
fn temp_pdf(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, b"%PDF-1.4\n% test statement\n").unwrap();
    (dir, path)
}

fn client(base: &str) -> HttpAnalysisService {
    HttpAnalysisService::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_round_trip_populates_state_verbatim() {
    let seen = Arc::new(Seen::default());
    let base = spawn(service_router(seen.clone())).await;
    let (_dir, pdf) = temp_pdf("october.pdf");

    let mut state = DashboardState::new();
    state.select_file(&pdf);
    assert!(run_analysis(&mut state, &client(&base), Readiness::UploadAck).await);

    let expected_statement: BankStatement = serde_json::from_str(&fixture("bank_statement.json")).unwrap();
    let expected_statistics: Statistics = serde_json::from_str(&fixture("statistics.json")).unwrap();
    assert!(!state.is_analyzing());
    assert_eq!(state.statement(), Some(&expected_statement));
    assert_eq!(state.statistics(), Some(&expected_statistics));

    let parts = seen.parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    let (name, file_name, content_type, size) = &parts[0];
    assert_eq!(name, "file");
    assert_eq!(file_name, pdf.file_name().unwrap().to_str().unwrap());
    assert_eq!(content_type, "application/pdf");
    assert!(*size > 0);

}

#[tokio::test]
async fn test_upload_error_status_fails_analysis() {
    let app = Router::new()
        .route(
            "/upload",
            post(|| async { (StatusCode::BAD_REQUEST, "Invalid file type") }),
        )
        .route("/load_bank_statement", get(|| async { fixture("bank_statement.json") }))
        .route("/get_statistics", get(|| async { fixture("statistics.json") }));
    let base = spawn(app).await;
    let (_dir, pdf) = temp_pdf("october.pdf");

    let mut state = DashboardState::new();
    state.select_file(&pdf);
    run_analysis(&mut state, &client(&base), Readiness::UploadAck).await;

    assert!(state.statement().is_none());
    assert!(state.statistics().is_none());
    assert_eq!(state.error(), Some(USER_ERROR_MESSAGE));
    assert!(!state.is_analyzing());

    let err = client(&base).upload(&pdf).await.unwrap_err();
    match err {
        IngestError::Upload { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Invalid file type");
        }
        other => panic!("unexpected error: {other}"),
    }

}

#[tokio::test]
async fn test_statistics_error_is_fetch_failure() {
    let app = Router::new()
        .route("/load_bank_statement", get(|| async { fixture("bank_statement.json") }))
        .route(
            "/get_statistics",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#) }),
        );
    let base = spawn(app).await;

    let err = stmtview_ingest::fetch_results(&client(&base)).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::Fetch {
            endpoint: "/get_statistics",
            status: 500,
            ..
        }
    ));
}

#[tokio::test]
async fn test_placeholder_body_is_decode_error() {
    let app = Router::new().route(
        "/load_bank_statement",
        get(|| async { "Bank statement not found" }),
    );
    let base = spawn(app).await;

    let err = client(&base).load_bank_statement().await.unwrap_err();
    assert!(matches!(err, IngestError::Decode { .. }));
}

#[tokio::test]
async fn test_poll_until_statement_appears() {
    let seen = Arc::new(Seen::default());
    let app = Router::new()
        .route("/upload", post(accept_upload))
        .route(
            "/load_bank_statement",
            get(|State(seen): State<Arc<Seen>>| async move {
                let n = seen.statement_requests.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    (StatusCode::NOT_FOUND, "Bank statement not found".to_string())
                } else {
                    (StatusCode::OK, fixture("bank_statement.json"))
                }
            }),
        )
        .route("/get_statistics", get(statistics))
        .with_state(seen.clone());
    let base = spawn(app).await;
    let (_dir, pdf) = temp_pdf("october.pdf");

    let readiness = Readiness::Poll {
        interval: Duration::from_millis(10),
        max_attempts: 10,
    };
    let analysis = analyze_file(&client(&base), &pdf, readiness).await.unwrap();
    assert_eq!(analysis.statement.account_holder_name, "Jordan Avery");
    assert_eq!(seen.statement_requests.load(Ordering::SeqCst), 3);

}

#[tokio::test]
async fn test_non_pdf_never_reaches_service() {
    let seen = Arc::new(Seen::default());
    let base = spawn(service_router(seen.clone())).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not a statement").unwrap();

    let err = client(&base).upload(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidFile(_)));
    assert!(seen.parts.lock().unwrap().is_empty());

}
