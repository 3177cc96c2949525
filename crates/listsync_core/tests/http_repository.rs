//! HTTP repository integration tests.
//!
//! Starts an axum server emulating the REST collections and drives the
//! blocking repositories against it from `spawn_blocking`.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use listsync_core::{
    ApiKeyPlacement, BackendConfig, HttpSongRepository, HttpWeaponRepository, NewWeapon,
    RecordRepository, RepoError, RepoOperation, Song, StoreOperation, Weapon, WeaponId,
    WeaponStore,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const API_KEY: &str = "anon-test-key";
const STAMPED_AT: &str = "2024-06-01T00:00:00+00:00";

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: &'static str,
    query: HashMap<String, String>,
    api_key_header: Option<String>,
    content_type: Option<String>,
    body: Option<Value>,
}

#[derive(Default)]
struct BackendState {
    rows: Vec<Value>,
    fail_next: HashMap<&'static str, u16>,
    raw_list_body: Option<String>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    fn with_rows(rows: Vec<Value>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().rows = rows;
        backend
    }

    fn fail_next(&self, method: &'static str, status: u16) {
        self.state.lock().unwrap().fail_next.insert(method, status);
    }

    fn serve_raw_list(&self, body: &str) {
        self.state.lock().unwrap().raw_list_body = Some(body.to_string());
    }

    fn rows(&self) -> Vec<Value> {
        self.state.lock().unwrap().rows.clone()
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn handle(
        &self,
        method: &'static str,
        query: HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<String>,
    ) -> Response {
        let mut state = self.state.lock().unwrap();
        let parsed_body = body.as_deref().and_then(|raw| serde_json::from_str(raw).ok());
        state.requests.push(RecordedRequest {
            method,
            query: query.clone(),
            api_key_header: header_value(headers, "apikey"),
            content_type: header_value(headers, "content-type"),
            body: parsed_body.clone(),
        });

        if let Some(status) = state.fail_next.remove(method) {
            let status = StatusCode::from_u16(status).unwrap();
            return (status, Json(json!({ "message": "rejected" }))).into_response();
        }

        match method {
            "GET" => match state.raw_list_body.take() {
                Some(raw) => (StatusCode::OK, raw).into_response(),
                None => (StatusCode::OK, Json(Value::Array(state.rows.clone()))).into_response(),
            },
            "POST" => {
                let Some(Value::Object(mut row)) = parsed_body else {
                    return StatusCode::BAD_REQUEST.into_response();
                };
                row.entry("created_at")
                    .or_insert_with(|| Value::String(STAMPED_AT.to_string()));
                state.rows.push(Value::Object(row));
                StatusCode::CREATED.into_response()
            }
            "DELETE" => {
                let Some(target) = query.get("id").and_then(|f| f.strip_prefix("eq.")) else {
                    return StatusCode::BAD_REQUEST.into_response();
                };
                state.rows.retain(|row| id_text(row) != target);
                StatusCode::NO_CONTENT.into_response()
            }
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn id_text(row: &Value) -> String {
    match &row["id"] {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

async fn list(
    State(backend): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.handle("GET", query, &headers, None)
}

async fn create(
    State(backend): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    backend.handle("POST", query, &headers, Some(body))
}

async fn remove(
    State(backend): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.handle("DELETE", query, &headers, None)
}

/// Bind to port 0 and return the base URL.
async fn start_server(backend: FakeBackend) -> String {
    let app = Router::new()
        .route("/rest/v1/weapons", get(list).post(create).delete(remove))
        .route("/rest/v1/songs", get(list).post(create).delete(remove))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base: &str) -> BackendConfig {
    BackendConfig::new(base, API_KEY).unwrap()
}

async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn ak47_row() -> Value {
    json!({
        "id": 1,
        "name": "AK-47",
        "year": 1947,
        "country": "USSR",
        "caliber": "7.62x39mm",
        "created_at": "2024-01-01"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_all_decodes_rows_and_sends_key_in_query() {
    let backend = FakeBackend::with_rows(vec![ak47_row()]);
    let repo = HttpWeaponRepository::new(&config(&start_server(backend.clone()).await));

    let weapons = blocking(move || repo.fetch_all()).await.unwrap();

    assert_eq!(
        weapons,
        vec![Weapon {
            id: WeaponId::new(1),
            name: "AK-47".to_string(),
            year: Some(1947),
            country: Some("USSR".to_string()),
            caliber: Some("7.62x39mm".to_string()),
            created_at: Some("2024-01-01".to_string()),
        }]
    );
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.get("apikey").map(String::as_str), Some(API_KEY));
    assert_eq!(requests[0].api_key_header, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_posts_json_without_server_owned_fields() {
    let backend = FakeBackend::default();
    let repo = HttpWeaponRepository::new(&config(&start_server(backend.clone()).await));
    let mut weapon = Weapon::new("Type 99");
    weapon.caliber = Some("7.7x58mm".to_string());
    let sent = weapon.clone();

    blocking(move || repo.create(&sent)).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let body = request.body.clone().unwrap();
    assert_eq!(body["id"], json!(weapon.id.get()));
    assert_eq!(body["caliber"], "7.7x58mm");
    assert!(body.get("created_at").is_none());
    assert!(body.get("year").is_none());
    assert_eq!(backend.rows().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_500_is_server_rejected() {
    let backend = FakeBackend::default();
    backend.fail_next("POST", 500);
    let repo = HttpWeaponRepository::new(&config(&start_server(backend.clone()).await));

    let err = blocking(move || repo.create(&Weapon::new("Sten")))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::ServerRejected {
            operation: RepoOperation::Create,
            status: 500
        }
    ));
    assert!(backend.rows().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_invalid_record_without_request() {
    let backend = FakeBackend::default();
    let repo = HttpSongRepository::new(&config(&start_server(backend.clone()).await));

    let err = blocking(move || repo.create(&Song::new("title", "singer", 9, None)))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_filters_by_id_and_expects_204() {
    let backend = FakeBackend::with_rows(vec![ak47_row(), json!({ "id": 2, "name": "FAL" })]);
    let repo = HttpWeaponRepository::new(&config(&start_server(backend.clone()).await));

    blocking(move || repo.delete(&WeaponId::new(1))).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.query.get("id").map(String::as_str), Some("eq.1"));
    assert_eq!(request.query.get("apikey").map(String::as_str), Some(API_KEY));
    assert_eq!(backend.rows(), vec![json!({ "id": 2, "name": "FAL" })]);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_with_404_is_server_rejected() {
    let backend = FakeBackend::with_rows(vec![ak47_row()]);
    backend.fail_next("DELETE", 404);
    let repo = HttpWeaponRepository::new(&config(&start_server(backend.clone()).await));

    let err = blocking(move || repo.delete(&WeaponId::new(1)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(backend.rows().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_all_reports_shape_mismatch_as_decoding() {
    let backend = FakeBackend::default();
    backend.serve_raw_list(r#"{"rows": []}"#);
    let repo = HttpWeaponRepository::new(&config(&start_server(backend).await));

    let err = blocking(move || repo.fetch_all()).await.unwrap_err();

    assert!(matches!(err, RepoError::Decoding(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_all_with_error_status_is_server_rejected() {
    let backend = FakeBackend::default();
    backend.fail_next("GET", 503);
    let repo = HttpSongRepository::new(&config(&start_server(backend).await));

    let err = blocking(move || repo.fetch_all()).await.unwrap_err();

    assert!(matches!(
        err,
        RepoError::ServerRejected {
            operation: RepoOperation::FetchAll,
            status: 503
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let repo = HttpSongRepository::new(&config(&base));

    let err = blocking(move || repo.fetch_all()).await.unwrap_err();

    assert!(matches!(err, RepoError::Transport(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn header_placement_sends_key_as_header() {
    let backend = FakeBackend::default();
    let config = config(&start_server(backend.clone()).await)
        .with_api_key_placement(ApiKeyPlacement::Header);
    let repo = HttpSongRepository::new(&config);

    blocking(move || repo.fetch_all()).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.api_key_header.as_deref(), Some(API_KEY));
    assert!(!request.query.contains_key("apikey"));
}

#[tokio::test(flavor = "multi_thread")]
async fn song_created_remotely_is_fetched_back_equal() {
    let backend = FakeBackend::default();
    let repo = Arc::new(HttpSongRepository::new(
        &config(&start_server(backend).await),
    ));
    let song = Song::new("Celebrity", "IU", 5, Some("lyrics".to_string()));

    let fetched = {
        let repo = Arc::clone(&repo);
        let song = song.clone();
        blocking(move || -> listsync_core::RepoResult<Vec<Song>> {
            repo.create(&song)?;
            repo.fetch_all()
        })
        .await
        .unwrap()
    };

    assert_eq!(fetched, vec![song]);
}

#[tokio::test(flavor = "multi_thread")]
async fn weapon_store_sees_created_at_only_after_reload() {
    let backend = FakeBackend::default();
    let store = Arc::new(WeaponStore::connect(&config(&start_server(backend).await)));

    let added = {
        let store = Arc::clone(&store);
        let request = NewWeapon::from_form("MG42", "1942", "", "");
        blocking(move || store.add_new(request)).await.unwrap()
    };
    assert_eq!(store.get(&added.id).unwrap().created_at, None);

    {
        let store = Arc::clone(&store);
        blocking(move || store.load()).await.unwrap();
    }
    assert_eq!(
        store.get(&added.id).unwrap().created_at.as_deref(),
        Some(STAMPED_AT)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn weapon_store_add_rejected_by_server_records_diagnostic() {
    let backend = FakeBackend::default();
    backend.fail_next("POST", 500);
    let store = Arc::new(WeaponStore::connect(&config(&start_server(backend).await)));

    let err = {
        let store = Arc::clone(&store);
        blocking(move || store.add(Weapon::new("Bren"))).await.unwrap_err()
    };

    assert_eq!(err.operation(), StoreOperation::Add);
    assert!(store.is_empty());
    assert_eq!(store.diagnostics().len(), 1);
}
