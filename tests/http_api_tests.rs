use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stratus::api::{ApiClient, ApiError, HttpResourceProvider, HttpSubmissionGateway, ResourceProvider, SubmissionGateway};
use stratus::models::{CreateServerRequest, ProjectScope};

#[derive(Clone, Default)]
struct Seen {
    headers: Arc<Mutex<Vec<(String, String, String)>>>,
    per_page: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    reject_create: bool,
}

impl Seen {
    fn record(&self, headers: &HeaderMap, query: &HashMap<String, String>) {
        let h = |k: &str| headers.get(k).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
        self.headers.lock().unwrap().push((h("api-token"), h("x-project-id"), h("user-agent")));
        self.per_page
            .lock()
            .unwrap()
            .push(query.get("per_page").cloned().unwrap_or_default());
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"code": "OKAY", "data": data}))
}

async fn flavors(State(s): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    s.record(&headers, &q);
    ok(json!([
        {"id": "f1", "name": "m1.small", "vcpus": 1, "ram": 2048, "disk": 20},
        {"id": 7, "name": "m1.large", "vcpus": "4", "ram_mb": 8192, "disk_gb": 80},
        {"name": "no-id"}
    ]))
}

async fn images(State(s): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    s.record(&headers, &q);
    ok(json!([{"id": "i1", "name": "ubuntu", "minDisk": 10, "status": "ACTIVE"}]))
}

async fn networks(State(s): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    s.record(&headers, &q);
    ok(json!([
        {"id": "n1", "name": "private"},
        {"id": "n2", "name": "public", "router:external": true}
    ]))
}

async fn keypairs(State(s): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    s.record(&headers, &q);
    ok(json!([{"keypair": {"name": "k1", "fingerprint": "aa:bb"}}]))
}

async fn security_groups(State(s): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    s.record(&headers, &q);
    ok(json!([{"name": "default", "description": "allow ssh"}]))
}

async fn create_instance(State(s): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    s.bodies.lock().unwrap().push(body.clone());
    if s.reject_create {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": "INVALID_INPUT",
                "detail": "Validation failed",
                "errors": {"name": "already in use"}
            })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "code": "CREATED",
            "data": {"server": {"id": "srv-1", "name": body["name"], "status": "BUILD"}}
        })),
    )
}

async fn spawn_stub(seen: Seen) -> String {
    let app = Router::new()
        .route("/v1/flavors", get(flavors))
        .route("/v1/images", get(images))
        .route("/v1/networks", get(networks))
        .route("/v1/keypairs", get(keypairs))
        .route("/v1/security-groups", get(security_groups))
        .route("/v1/instances", post(create_instance))
        .with_state(seen);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> ApiClient {
    let http = reqwest::Client::builder().user_agent("stratus-test").build().unwrap();
    ApiClient::new(http, base, "secret-token")
}

fn request() -> CreateServerRequest {
    CreateServerRequest {
        flavor_id: "f1".into(),
        image_id: "i1".into(),
        network_id: "n1".into(),
        key_name: "k1".into(),
        security_group: "default".into(),
        name: "vm-01".into(),
        admin_username: "admin".into(),
        admin_password: "Secret123".into(),
    }
}

#[tokio::test]
async fn lists_all_resources_with_scope_headers() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let provider = HttpResourceProvider::new(client(&base));

    let catalog = provider.list_resources(&ProjectScope::new("tenant-a")).await.unwrap();

    assert_eq!(catalog.flavors.len(), 2);
    assert_eq!(catalog.flavors[0].ram_mb, 2048);
    assert_eq!(catalog.flavors[1].id, "7");
    assert_eq!(catalog.flavors[1].vcpus, 4);
    assert_eq!(catalog.images[0].min_disk_gb, 10);
    assert_eq!(catalog.images[0].status, "active");
    assert!(catalog.network("n2").unwrap().external);
    assert_eq!(catalog.keypairs[0].name, "k1");
    assert_eq!(catalog.security_group("default").unwrap().id, "default");

    let headers = seen.headers.lock().unwrap().clone();
    assert_eq!(headers.len(), 5);
    for (token, project, agent) in headers {
        assert_eq!(token, "secret-token");
        assert_eq!(project, "tenant-a");
        assert_eq!(agent, "stratus-test");
    }
    assert!(seen.per_page.lock().unwrap().iter().all(|p| p == "1000"));
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let provider = HttpResourceProvider::new(client(&base));
    let err = provider.list_resources(&ProjectScope::new("p1")).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn create_server_posts_request_and_unwraps_record() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let gateway = HttpSubmissionGateway::new(client(&base));

    let created = gateway.create_server(&ProjectScope::new("p1"), &request()).await.unwrap();

    assert_eq!(created.id, "srv-1");
    assert_eq!(created.name, "vm-01");
    assert_eq!(created.status, "BUILD");
    let bodies = seen.bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![serde_json::to_value(request()).unwrap()]);
}

#[tokio::test]
async fn create_server_rejection_carries_messages() {
    let seen = Seen { reject_create: true, ..Default::default() };
    let base = spawn_stub(seen).await;
    let gateway = HttpSubmissionGateway::new(client(&base));

    let err = gateway.create_server(&ProjectScope::new("p1"), &request()).await.unwrap_err();

    assert_eq!(
        err.messages(),
        vec!["Validation failed".to_string(), "name: already in use".to_string()]
    );
    match err {
        ApiError::Rejected { code, .. } => assert_eq!(code, "INVALID_INPUT"),
        other => panic!("unexpected error: {other:?}"),
    }
}
