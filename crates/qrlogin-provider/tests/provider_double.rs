//! Drives `RiotClient` against an in-process provider double.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use qrlogin_core::{LoginProvider, PollOutcome, ProviderError, login_url};
use qrlogin_provider::{ProviderProfile, RiotClient};
use serde_json::{Value, json};
use tokio_test::assert_ok;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Recorded {
    step: &'static str,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Option<Value>,
}

#[derive(Default)]
struct Double {
    requests: Mutex<Vec<Recorded>>,
    login_response: Mutex<Value>,
    token_after: Mutex<u32>,
    polls: Mutex<u32>,
}

impl Double {
    fn record(&self, step: &'static str, headers: HeaderMap, query: HashMap<String, String>, body: Option<Value>) {
        self.requests.lock().unwrap().push(Recorded {
            step,
            headers,
            query,
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

type Shared = Arc<Double>;

async fn config(
    State(double): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    double.record("config", headers, query, None);
    (
        [(header::SET_COOKIE, "clientconfig=seen; Path=/")],
        Json(json!({ "keystone.client.feature": true })),
    )
}

async fn discovery(State(double): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    double.record("discovery", headers, HashMap::new(), None);
    (
        [(header::SET_COOKIE, "asid=handshake; Path=/")],
        Json(json!({ "issuer": "https://auth.riotgames.com" })),
    )
}

async fn login_init(
    State(double): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    double.record("login", headers, HashMap::new(), Some(body));
    let response = double.login_response.lock().unwrap().clone();
    Json(response)
}

async fn login_poll(State(double): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    double.record("poll", headers, HashMap::new(), None);
    let polls = {
        let mut polls = double.polls.lock().unwrap();
        *polls += 1;
        *polls
    };
    if polls > *double.token_after.lock().unwrap() {
        (
            StatusCode::OK,
            Json(json!({ "type": "success", "success": { "login_token": "tok-123" } })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "pending" })))
    }
}

async fn spawn_double(double: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/config/public", get(config))
        .route("/.well-known/openid-configuration", get(discovery))
        .route("/api/v1/login", get(login_poll).post(login_init))
        .with_state(double);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn client_with(login_response: Value, token_after: u32) -> (Shared, RiotClient) {
    let double = Arc::new(Double::default());
    *double.login_response.lock().unwrap() = login_response;
    *double.token_after.lock().unwrap() = token_after;
    let addr = spawn_double(Arc::clone(&double)).await;
    let client = RiotClient::new(ProviderProfile::default().with_base_url(format!("http://{addr}")));
    (double, client)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_handshake_runs_in_order_with_metadata() {
    let (double, client) = client_with(
        json!({ "cluster": "C1", "suuid": "S1", "timestamp": "T1", "type": "auth" }),
        0,
    )
    .await;
    let session_id = Uuid::new_v4();

    let (challenge, _connection) = assert_ok!(client.begin_challenge(session_id).await);

    assert_eq!(challenge.login_url(), login_url("C1", "S1", "T1"));

    let requests = double.requests();
    let steps: Vec<_> = requests.iter().map(|r| r.step).collect();
    assert_eq!(steps, ["config", "discovery", "login"]);

    let baggage = format!("sdksid={session_id}");
    for request in &requests {
        assert_eq!(header_str(&request.headers, "baggage"), Some(baggage.as_str()));
        assert_eq!(header_str(&request.headers, "accept"), Some("application/json"));
    }

    let traces: Vec<_> = requests
        .iter()
        .map(|r| header_str(&r.headers, "traceparent").unwrap().to_string())
        .collect();
    assert_ne!(traces[0], traces[1]);
    assert_ne!(traces[1], traces[2]);

    let agents: Vec<_> = requests
        .iter()
        .map(|r| header_str(&r.headers, "user-agent").unwrap().to_string())
        .collect();
    assert!(agents[0].contains(" client-config "));
    assert!(agents[1].contains(" rso-auth "));
    assert!(agents[2].contains(" rso-authenticator "));

    let query = &requests[0].query;
    assert_eq!(query.get("os").map(String::as_str), Some("windows"));
    assert_eq!(query.get("region").map(String::as_str), Some("KR"));
    assert_eq!(query.get("app").map(String::as_str), Some("Riot Client"));

    assert!(requests[0].headers.get("content-type").is_none());
    assert!(requests[1].headers.get("content-type").is_none());
    let content_types: Vec<_> = requests[2].headers.get_all("content-type").iter().collect();
    assert_eq!(content_types, ["application/json"]);

    let body = requests[2].body.as_ref().unwrap();
    assert_eq!(body["clientId"], "riot-client");
    assert_eq!(body["qrcode"], json!({}));
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (_, client) = client_with(json!({ "cluster": "C1", "timestamp": 1_700_000_000_000_u64 }), 0).await;

    let err = client.begin_challenge(Uuid::new_v4()).await.unwrap_err();

    match err {
        ProviderError::MissingFields(fields) => assert_eq!(fields, vec!["suuid"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_poll_reuses_session_cookies() {
    let (double, client) = client_with(
        json!({ "cluster": "C1", "suuid": "S1", "timestamp": 1_700_000_000_000_u64 }),
        1,
    )
    .await;
    let session_id = Uuid::new_v4();
    let (challenge, connection) = client.begin_challenge(session_id).await.unwrap();
    assert_eq!(challenge.timestamp, "1700000000000");

    let first = assert_ok!(client.poll_once(&connection, session_id).await);
    let second = assert_ok!(client.poll_once(&connection, session_id).await);

    assert_eq!(first, PollOutcome::NotReady { status: 401 });
    let PollOutcome::Ready(token) = second else {
        panic!("expected token, got {second:?}");
    };
    assert_eq!(token.as_value()["success"]["login_token"], "tok-123");

    let polls: Vec<_> = double
        .requests()
        .into_iter()
        .filter(|r| r.step == "poll")
        .collect();
    assert_eq!(polls.len(), 2);
    for poll in &polls {
        assert_eq!(header_str(&poll.headers, "content-type"), Some("application/json"));
        let cookies = header_str(&poll.headers, "cookie").unwrap();
        assert!(cookies.contains("asid=handshake"));
        assert!(cookies.contains("clientconfig=seen"));
    }
}

#[tokio::test]
async fn test_sessions_do_not_share_cookies() {
    let (double, client) = client_with(json!({ "cluster": "C1", "suuid": "S1", "timestamp": "T1" }), 0).await;

    client.begin_challenge(Uuid::new_v4()).await.unwrap();
    client.begin_challenge(Uuid::new_v4()).await.unwrap();

    let configs: Vec<_> = double
        .requests()
        .into_iter()
        .filter(|r| r.step == "config")
        .collect();
    assert_eq!(configs.len(), 2);
    assert!(configs.iter().all(|r| r.headers.get("cookie").is_none()));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RiotClient::new(ProviderProfile::default().with_base_url(format!("http://{addr}")));

    let err = client.begin_challenge(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Transport {
            operation: "client config",
            ..
        }
    ));
}
