//! End-to-end tests for `GET`/`PUT /api/config`.
//!
//! Run with:
//!   cargo test -p gitnotify --test config_api_e2e

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use gitnotify::{
    AppState, Config, ConfigStore, Notification, NotificationRule, Notify, RuleSet,
    ServerSettings, router,
};
use gitnotify_std::fs::MemFs;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use tower::ServiceExt as _;

type HmacSha256 = Hmac<Sha256>;

const TOKEN: &str = "devtoken";
const CONFIG_PATH: &str = "/etc/gitnotify/config.yml";

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
    lines: Mutex<Vec<String>>,
}

impl Notify for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.lines.lock().unwrap().push(notification.to_string());
    }
}

struct Harness {
    state: AppState,
    fs: Arc<MemFs>,
    notifier: Arc<RecordingNotifier>,
}

fn initial_config() -> Config {
    Config {
        organization: "acme".to_string(),
        port: 8080,
        webhook_secret: "old-secret".to_string(),
        notifications: RuleSet::new(vec![
            NotificationRule::new("issues").with_actions(["opened"]),
        ]),
        ..Config::default()
    }
}

fn harness(settings: ServerSettings) -> Harness {
    let fs = Arc::new(MemFs::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let store = Arc::new(ConfigStore::new(initial_config(), CONFIG_PATH, fs.clone()));
    let state = AppState::new(store, notifier.clone(), settings);
    Harness {
        state,
        fs,
        notifier,
    }
}

fn with_token() -> Harness {
    harness(ServerSettings::default().with_config_token(TOKEN))
}

async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    router(state.clone()).oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn get_config(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/config");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn put_config(token: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/api/config")
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap()
}

fn valid_update() -> Value {
    json!({
        "organization": "globex",
        "port": 9090,
        "webhook_secret": "new-secret",
        "notifications": [
            {"event_type": "pull_request", "repos": ["core"]}
        ],
        "github_app": {
            "app_id": 12345,
            "installation_id": 67890,
            "private_key_path": "/etc/gitnotify/app.pem"
        }
    })
}

fn signed_delivery(secret: &str, event: &str, body: &[u8]) -> Request<Body> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    let sig = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("X-Hub-Signature-256", sig)
        .header("X-GitHub-Event", event)
        .body(Body::from(body.to_vec()))
        .unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_server_token_returns_500() {
    let h = harness(ServerSettings::default());

    let resp = send(&h.state, get_config(Some(TOKEN))).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await, b"Config API token not set");
}

#[tokio::test]
async fn missing_bearer_returns_401() {
    let h = with_token();

    let resp = send(&h.state, get_config(None)).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({"error": "unauthorized"}));
}

#[tokio::test]
async fn wrong_bearer_returns_401_and_does_not_update() {
    let h = with_token();

    let resp = send(&h.state, put_config("nope", valid_update().to_string())).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(*h.state.store().snapshot(), initial_config());
    assert!(h.fs.is_empty());
}

#[tokio::test]
async fn get_returns_current_config() {
    let h = with_token();

    let resp = send(&h.state, get_config(Some(TOKEN))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["organization"], "acme");
    assert_eq!(json["port"], 8080);
    assert_eq!(json["webhook_secret"], "old-secret");
    assert_eq!(
        json["notifications"],
        json!([{"event_type": "issues", "actions": ["opened"], "repos": []}])
    );
}

/// Port 70000 fails validation: 400, and nothing is written or activated.
#[tokio::test]
async fn put_with_out_of_range_port_returns_400_and_keeps_config() {
    let h = with_token();
    let mut update = valid_update();
    update["port"] = json!(70000);

    let resp = send(&h.state, put_config(TOKEN, update.to_string())).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "invalid config: port must be between 1 and 65535"})
    );
    assert_eq!(*h.state.store().snapshot(), initial_config());
    assert!(h.fs.is_empty());
}

#[tokio::test]
async fn put_without_organization_returns_400() {
    let h = with_token();
    let mut update = valid_update();
    update["organization"] = json!("");

    let resp = send(&h.state, put_config(TOKEN, update.to_string())).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "invalid config: organization is required"})
    );
}

#[tokio::test]
async fn put_with_invalid_json_returns_400() {
    let h = with_token();

    let resp = send(&h.state, put_config(TOKEN, "{organization: ")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({"error": "invalid JSON"}));
    assert_eq!(*h.state.store().snapshot(), initial_config());
}

#[tokio::test]
async fn put_persistence_failure_returns_500_and_keeps_config() {
    let h = with_token();
    h.fs.fail_writes(true);

    let resp = send(&h.state, put_config(TOKEN, valid_update().to_string())).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to save config:"),
        "unexpected body: {json}"
    );
    assert_eq!(*h.state.store().snapshot(), initial_config());
}

/// A valid PUT is persisted as YAML, reflected by GET, and drives webhook
/// matching (including the new webhook secret) from then on.
#[tokio::test]
async fn put_valid_config_activates_and_persists_it() {
    let h = with_token();

    let resp = send(&h.state, put_config(TOKEN, valid_update().to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"status": "ok"}));

    let resp = send(&h.state, get_config(Some(TOKEN))).await;
    let json = body_json(resp).await;
    assert_eq!(json["organization"], "globex");
    assert_eq!(json["port"], 9090);
    assert_eq!(json["github_app"]["app_id"], 12345);

    let saved = Config::from_yaml(&h.fs.get(CONFIG_PATH).unwrap()).unwrap();
    assert_eq!(saved, *h.state.store().snapshot());
    assert_eq!(
        saved.notifications,
        RuleSet::new(vec![NotificationRule::new("pull_request").with_repos(["core"])])
    );

    let issue = json!({
        "action": "opened",
        "issue": {"number": 1, "title": "Old rule", "user": {"login": "a"}},
        "repository": {"name": "core"}
    })
    .to_string();
    let pr = json!({
        "action": "opened",
        "pull_request": {"number": 2, "title": "New rule", "user": {"login": "b"}},
        "repository": {"name": "core"}
    })
    .to_string();

    let resp = send(&h.state, signed_delivery("old-secret", "issues", issue.as_bytes())).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&h.state, signed_delivery("new-secret", "issues", issue.as_bytes())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&h.state, signed_delivery("new-secret", "pull_request", pr.as_bytes())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(
        *h.notifier.lines.lock().unwrap(),
        vec!["New Pull Request Opened: #2 - New rule by b".to_string()]
    );
}

#[tokio::test]
async fn unsupported_method_returns_405() {
    let h = with_token();

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/config")
        .header("Authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let resp = send(&h.state, request).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = resp.headers().get("allow").unwrap().to_str().unwrap();
    assert!(allow.contains("GET") && allow.contains("PUT"), "allow: {allow}");
}

/// Method routing happens before the token check: an unsupported method gets
/// 405 even when no server token is configured.
#[tokio::test]
async fn unsupported_method_is_rejected_before_token_check() {
    let h = harness(ServerSettings::default());

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/config")
        .body(Body::empty())
        .unwrap();
    let resp = send(&h.state, request).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
