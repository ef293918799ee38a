use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use hackerone_exporter::domain::errors::ApiError;
use hackerone_exporter::domain::ports::BountyPlatform;
use hackerone_exporter::infrastructure::core::HttpClientFactory;
use hackerone_exporter::infrastructure::hackerone::HackerOneClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use url::Url;

// "exporter:s3cret"
const EXPECTED_AUTH: &str = "Basic ZXhwb3J0ZXI6czNjcmV0";

#[derive(Clone, Default)]
struct Upstream {
    requests: Arc<AtomicUsize>,
    last_query: Arc<std::sync::Mutex<HashMap<String, String>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(EXPECTED_AUTH)
}

async fn programs(State(up): State<Upstream>, headers: HeaderMap) -> impl IntoResponse {
    up.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, r#"{"errors":[]}"#.to_string());
    }
    (
        StatusCode::OK,
        r#"{"data":[
            {"id":"11","type":"program","attributes":{"handle":"acme","created_at":"2024-01-01T00:00:00Z"}},
            {"id":"12","type":"program","attributes":{"handle":"acme-vdp"}}
        ],"links":{}}"#
            .to_string(),
    )
}

async fn reports(
    State(up): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    up.requests.fetch_add(1, Ordering::SeqCst);
    *up.last_query.lock().unwrap() = query;
    r#"{"data":[
        {"id":"1","type":"report","attributes":{"state":"new"}},
        {"id":"2","type":"report","attributes":{"state":"resolved"}}
    ],"links":{"self":"/v1/reports"}}"#
}

/// Endless pagination: every page links to the next one
async fn weaknesses(
    State(up): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    up.requests.fetch_add(1, Ordering::SeqCst);
    let page: usize = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    format!(
        r#"{{"data":[{{"id":"{page}","attributes":{{"name":"W{page}"}}}}],"links":{{"next":"/v1/programs/11/weaknesses?page={next}"}}}}"#,
        page = page,
        next = page + 1
    )
}

async fn broken() -> impl IntoResponse {
    "<html>not json</html>"
}

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

async fn spawn_upstream() -> (Url, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/v1/me/programs", get(programs))
        .route("/v1/reports", get(reports))
        .route("/v1/programs/{id}/weaknesses", get(weaknesses))
        .route("/v1/programs/{id}/hacker_invitations", get(broken))
        .with_state(upstream.clone());

    (serve(app).await, upstream)
}

fn client(base_url: Url, password: &str) -> HackerOneClient {
    HackerOneClient::builder()
        .http_client(HttpClientFactory::create_client(Duration::from_secs(5), 0))
        .username("exporter")
        .password(password)
        .base_url(base_url)
        .build()
        .expect("client")
}

#[tokio::test]
async fn test_fetch_programs_with_basic_auth() {
    let (base, _) = spawn_upstream().await;
    let programs = assert_ok!(client(base, "s3cret").fetch_programs().await);

    let handles: Vec<&str> = programs.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, vec!["acme", "acme-vdp"]);
    assert_eq!(programs[0].id, "11");
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let (base, _) = spawn_upstream().await;
    let err = assert_err!(client(base, "wrong").fetch_programs().await);

    match err {
        ApiError::Status { status, endpoint } => {
            assert_eq!(status, 401);
            assert_eq!(endpoint, "/v1/me/programs");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reports_filtered_by_program_handle() {
    let (base, upstream) = spawn_upstream().await;
    let reports = assert_ok!(client(base, "s3cret").fetch_reports("acme").await);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].state, "resolved");
    let query = upstream.last_query.lock().unwrap().clone();
    assert_eq!(query.get("filter[program][]").map(String::as_str), Some("acme"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (base, _) = spawn_upstream().await;
    let err = assert_err!(client(base, "s3cret").fetch_invited_hackers("11").await);

    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.endpoint(), "/v1/programs/11/hacker_invitations");
}

#[tokio::test]
async fn test_unmatched_route_is_status_error() {
    let (base, _) = spawn_upstream().await;
    let err = assert_err!(client(base, "s3cret").fetch_assets("1337").await);
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = Url::parse(&format!("http://{}", addr)).unwrap();
    let err = assert_err!(client(base, "s3cret").fetch_programs().await);
    assert!(matches!(err, ApiError::Transport { .. }));
}

#[tokio::test]
async fn test_first_page_only_by_default() {
    let (base, upstream) = spawn_upstream().await;
    let weaknesses = assert_ok!(client(base, "s3cret").fetch_weaknesses("11").await);

    assert_eq!(weaknesses.len(), 1);
    assert_eq!(weaknesses[0].name, "W1");
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pagination_is_bounded() {
    let (base, upstream) = spawn_upstream().await;
    let client = HackerOneClient::builder()
        .http_client(HttpClientFactory::create_client(Duration::from_secs(5), 0))
        .username("exporter")
        .password("s3cret")
        .base_url(base)
        .follow_pagination(3)
        .build()
        .expect("client");

    let weaknesses = assert_ok!(client.fetch_weaknesses("11").await);

    let ids: Vec<&str> = weaknesses.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(upstream.requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_pagination_never_leaves_api_origin() {
    // Records whatever reaches the other host
    let other = Upstream::default();
    let seen_auth: Arc<std::sync::Mutex<Option<String>>> = Arc::default();
    let other_app = Router::new()
        .route(
            "/v1/me/programs",
            get({
                let seen_auth = seen_auth.clone();
                move |State(up): State<Upstream>, headers: HeaderMap| async move {
                    up.requests.fetch_add(1, Ordering::SeqCst);
                    *seen_auth.lock().unwrap() = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    r#"{"data":[]}"#
                }
            }),
        )
        .with_state(other.clone());
    let other_base = serve(other_app).await;

    let next = other_base.join("/v1/me/programs?page=2").unwrap();
    let body = format!(
        r#"{{"data":[{{"id":"11","attributes":{{"handle":"acme"}}}}],"links":{{"next":"{}"}}}}"#,
        next
    );
    let api = Upstream::default();
    let api_app = Router::new()
        .route(
            "/v1/me/programs",
            get(move |State(up): State<Upstream>| async move {
                up.requests.fetch_add(1, Ordering::SeqCst);
                body
            }),
        )
        .with_state(api.clone());
    let api_base = serve(api_app).await;

    let client = HackerOneClient::builder()
        .http_client(HttpClientFactory::create_client(Duration::from_secs(5), 0))
        .username("exporter")
        .password("s3cret")
        .base_url(api_base)
        .follow_pagination(5)
        .build()
        .expect("client");

    let programs = assert_ok!(client.fetch_programs().await);

    // First page kept, off-origin page never requested
    assert_eq!(programs.len(), 1);
    assert_eq!(api.requests.load(Ordering::SeqCst), 1);
    assert_eq!(other.requests.load(Ordering::SeqCst), 0);
    assert_eq!(*seen_auth.lock().unwrap(), None);
}
