use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use folio_api::{AppState, AppStateInner, MailSettings, auth, links::LinkProber, router, session::SessionManager};
use folio_crypto::{RotatingSecret, TokenSigner};
use folio_db::Database;
use folio_types::api::NewCertification;

const ADMIN_EMAIL: &str = "admin@test.com";
const ADMIN_PASSWORD: &str = "hunter22";

fn test_state() -> AppState {
    let db = Database::open_in_memory().unwrap();
    let hash = auth::hash_password(ADMIN_PASSWORD).unwrap();
    db.ensure_admin("admin", ADMIN_EMAIL, &hash).unwrap();

    let secret = Arc::new(RotatingSecret::new());
    secret.maybe_rotate(Utc::now());

    Arc::new(AppStateInner {
        db,
        session: SessionManager::new(),
        signer: TokenSigner::new(secret, b"test-app-key"),
        prober: LinkProber::new(Duration::from_secs(5)).unwrap(),
        mail: MailSettings {
            sender_name: "Folio".into(),
            address: "owner@test.com".into(),
            unsubscribe_url: "http://localhost:5173/newsletter/unsubscribe".into(),
        },
    })
}

async fn call(
    state: &AppState,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn call_json(
    state: &AppState,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = call(state, method, uri, bearer, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn login(state: &AppState) -> String {
    let (status, body) = call_json(
        state,
        Method::POST,
        "/admin/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["bearer"].as_str().unwrap().to_string()
}

// -- Auth --

#[tokio::test]
async fn login_outcomes() {
    let state = test_state();

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/login",
        None,
        Some(json!({ "email": "not-an-email", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/login",
        None,
        Some(json!({ "email": "nobody@test.com", "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrongpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Incorrect password.");

    let bearer = login(&state).await;
    assert!(!bearer.is_empty());
}

#[tokio::test]
async fn admin_routes_need_active_session() {
    let state = test_state();

    let (status, bytes) = call(&state, Method::GET, "/newsletter/getsubs", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(bytes.is_empty());

    let bearer = login(&state).await;
    let (status, _) = call(&state, Method::GET, "/newsletter/getsubs", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&state, Method::POST, "/admin/logout", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&state, Method::GET, "/newsletter/getsubs", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- SQL console --

#[tokio::test]
async fn sql_console_statuses() {
    let state = test_state();
    let bearer = login(&state).await;

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/sql",
        Some(&bearer),
        Some(json!({ "query": "* FROM admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["res"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let keys: Vec<&str> = rows[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["id", "username", "email", "password"]);

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/sql",
        Some(&bearer),
        Some(json!({ "query": "* FROM project_post" })),
    )
    .await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body["res"], "Table exists but is empty");

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/admin/sql",
        Some(&bearer),
        Some(json!({ "query": "* FROM no_such_table" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["err_msg"].is_string());

    let (status, body) = call_json(&state, Method::POST, "/admin/sql", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data was provided!");
}

// -- Newsletter --

#[tokio::test]
async fn newsletter_flow() {
    let state = test_state();
    let bearer = login(&state).await;

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/newsletter/subscribe",
        None,
        Some(json!({ "email": "reader@test.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "email subscribed to newsletter!");

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/newsletter/subscribe",
        None,
        Some(json!({ "email": "reader@test.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "reader@test.com is already subscribed");

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/newsletter/subscribe",
        None,
        Some(json!({ "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["errors"]["email"].is_array());

    let (_, body) = call_json(&state, Method::GET, "/newsletter/getsubs", Some(&bearer), None).await;
    assert_eq!(body["res"], json!(["reader@test.com"]));

    // Draft lifecycle
    let (status, _) = call(&state, Method::GET, "/newsletter/draft", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &state,
        Method::POST,
        "/newsletter/draft",
        Some(&bearer),
        Some(json!({ "title": "Issue 1", "content": { "blocks": [] } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call_json(&state, Method::GET, "/newsletter/draft", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Issue 1");

    let (status, _) = call(&state, Method::DELETE, "/newsletter/draft", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&state, Method::GET, "/newsletter/draft", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Sending queues one message per subscriber with a working link
    let (status, body) = call_json(
        &state,
        Method::POST,
        "/newsletter/send",
        Some(&bearer),
        Some(json!({ "title": "Issue 1", "content": "<p>hello</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let queued = state.db.queued_mail().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].recipient, "reader@test.com");
    assert_eq!(queued[0].subject, "Issue 1");

    let marker = "unsubscribe?t=";
    let start = queued[0].html.find(marker).unwrap() + marker.len();
    let rest = &queued[0].html[start..];
    let token = &rest[..rest.find('"').unwrap()];

    let uri = format!("/newsletter/unsubscribe?t={token}");
    let (status, body) = call_json(&state, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "reader@test.com has been unsubscribed");

    let (status, body) = call_json(&state, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Email is not subscribed to the newsletter");
}

#[tokio::test]
async fn unsubscribe_rejects_bad_tokens() {
    let state = test_state();

    let (status, body) = call_json(&state, Method::DELETE, "/newsletter/unsubscribe", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No unsubscribe token was provided!");

    let (status, body) =
        call_json(&state, Method::DELETE, "/newsletter/unsubscribe?t=123abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Malformed unsubscribe token");

    let (status, body) = call_json(
        &state,
        Method::DELETE,
        "/newsletter/unsubscribe?t=123abc.zien.duecb89d",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["expired"].is_string());
}

// -- Content --

#[tokio::test]
async fn showcase_membership() {
    let state = test_state();
    let bearer = login(&state).await;

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/projects/add",
        Some(&bearer),
        Some(json!({
            "name": "Folio",
            "start_date": "01/2024",
            "skills": "Rust",
            "project_repo_url": "https://github.com/test/folio"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let add = json!({ "project_name": "Folio" });
    let (status, body) =
        call_json(&state, Method::POST, "/showcase/add", Some(&bearer), Some(add.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "Folio was successfully added to Showcase");

    let (status, body) =
        call_json(&state, Method::POST, "/showcase/add", Some(&bearer), Some(add.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Folio is already in the Showcase");

    let (status, body) = call_json(
        &state,
        Method::POST,
        "/showcase/add",
        Some(&bearer),
        Some(json!({ "project_name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Ghost is not an existing project");

    let (status, _) =
        call_json(&state, Method::DELETE, "/showcase/remove", Some(&bearer), Some(add.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        call_json(&state, Method::DELETE, "/showcase/remove", Some(&bearer), Some(add)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Folio is not in the Showcase");

    let (status, body) = call_json(&state, Method::GET, "/projects", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No page data was provided!");

    let (status, body) = call_json(&state, Method::GET, "/projects?page=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// -- Link report --

#[tokio::test]
async fn link_report_marks_missing_pages_dead() {
    let site = Router::new().route("/ok", get(|| async { "fine" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, site).await.unwrap();
    });

    // Nothing listens here once the listener is dropped
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let state = test_state();
    let bearer = login(&state).await;

    let (_, body) = call_json(&state, Method::GET, "/admin/links", Some(&bearer), None).await;
    assert_eq!(body["report"], "No links were found to inspect");

    state
        .db
        .insert_certification(&NewCertification {
            name: "Gone".into(),
            issuing_org: "Test Org".into(),
            issue_date: "January 2024".into(),
            issue_exp: None,
            credential_id: None,
            credential_url: format!("http://{addr}/missing"),
        })
        .unwrap();
    state
        .db
        .insert_certification(&NewCertification {
            name: "Unreachable".into(),
            issuing_org: "Test Org".into(),
            issue_date: "January 2024".into(),
            issue_exp: None,
            credential_id: None,
            credential_url: format!("http://{closed_addr}/cert"),
        })
        .unwrap();
    state
        .db
        .insert_certification(&NewCertification {
            name: "Here".into(),
            issuing_org: "Test Org".into(),
            issue_date: "January 2024".into(),
            issue_exp: None,
            credential_id: None,
            credential_url: format!("http://{addr}/ok"),
        })
        .unwrap();

    let (status, body) = call_json(&state, Method::GET, "/admin/links", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);

    let report = body["report"].as_array().unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(report[0]["table"], "cert_and_license");
    assert_eq!(report[0]["column"], "credential_url");
    assert_eq!(report[0]["verdict"], "dead");
    assert_eq!(report[0]["http_code"], 404);

    // A refused connection is dead with no status, and the scan carries on
    assert_eq!(report[1]["verdict"], "dead");
    assert_eq!(report[1]["http_code"], Value::Null);

    assert_eq!(report[2]["verdict"], "live");
    assert_eq!(report[2]["http_code"], 200);
}
