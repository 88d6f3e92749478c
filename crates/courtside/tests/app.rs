//! End-to-end tests for the Courtside client.
//!
//! These tests spin up a stub fantasy API (axum on a random port) that
//! keeps one account's roster in memory, then drive it through the
//! public `Courtside` context: login, catalog, edit, save, expiry and
//! account administration.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use courtside::prelude::*;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "tok-123";

// =========================================================================
// Stub API
// =========================================================================

#[derive(Default)]
struct Account {
    roster: Vec<u64>,
    token_revoked: bool,
    saves: usize,
    /// Answer saves with `{"message": "Team updated"}` only.
    ack_only: bool,
    admin: bool,
    /// Other accounts, visible to an administrator.
    others: Vec<u64>,
    reset: Vec<u64>,
}

type Shared = Arc<Mutex<Account>>;

fn player(id: u64) -> Value {
    json!({
        "id": id,
        "full_name": format!("Player {id}"),
        "position": "G",
        "team_name": "Testers",
        "average_fantasy_points": 10.0 + id as f64,
        "last_game_fantasy_points": null
    })
}

fn profile(account: &Account) -> Value {
    let total: f64 = account.roster.iter().map(|id| 10.0 + *id as f64).sum();
    json!({
        "id": 1,
        "email": "fan@example.com",
        "role": if account.admin { "admin" } else { "user" },
        "total_fantasy_points": total,
        "players": account.roster.iter().copied().map(player).collect::<Vec<_>>()
    })
}

fn authorized(headers: &HeaderMap, account: &Account) -> bool {
    let expected = format!("Bearer {TOKEN}");
    !account.token_revoked
        && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
}

async fn login(State(shared): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "fan@example.com" && body["password"] == "secret" {
        shared.lock().unwrap().token_revoked = false;
        (
            StatusCode::OK,
            Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "fan@example.com" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Email already registered" })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "id": 2, "email": body["email"] })))
    }
}

async fn me(State(shared): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let account = shared.lock().unwrap();
    if !authorized(&headers, &account) {
        return unauthorized();
    }
    (StatusCode::OK, Json(profile(&account)))
}

async fn players(State(shared): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let account = shared.lock().unwrap();
    if !authorized(&headers, &account) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(Value::Array((1..=12).map(player).collect())),
    )
}

async fn get_team(State(shared): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let account = shared.lock().unwrap();
    if !authorized(&headers, &account) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(Value::Array(account.roster.iter().copied().map(player).collect())),
    )
}

/// Replaces the roster and answers with the full profile.
async fn post_team(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut account = shared.lock().unwrap();
    if !authorized(&headers, &account) {
        return unauthorized();
    }
    let ids: Vec<u64> = body["player_ids"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default();
    if let Some(unknown) = ids.iter().find(|id| !(1..=12).contains(*id)) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Player {unknown} not found") })),
        );
    }
    account.roster = ids;
    account.saves += 1;
    if account.ack_only {
        return (StatusCode::OK, Json(json!({ "message": "Team updated" })));
    }
    (StatusCode::OK, Json(profile(&account)))
}

fn admin_refusal(headers: &HeaderMap, account: &Account) -> Option<(StatusCode, Json<Value>)> {
    if !authorized(headers, account) {
        return Some(unauthorized());
    }
    (!account.admin).then(|| {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "Not enough permissions" })),
        )
    })
}

async fn list_users(State(shared): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let account = shared.lock().unwrap();
    if let Some(refusal) = admin_refusal(&headers, &account) {
        return refusal;
    }
    let mut users = vec![profile(&account)];
    users.extend(account.others.iter().map(|id| {
        json!({
            "id": id,
            "email": format!("user{id}@example.com"),
            "role": "user",
            "total_fantasy_points": 0.0
        })
    }));
    (StatusCode::OK, Json(Value::Array(users)))
}

async fn delete_user(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    let mut account = shared.lock().unwrap();
    if let Some(refusal) = admin_refusal(&headers, &account) {
        return refusal;
    }
    let before = account.others.len();
    account.others.retain(|other| *other != id);
    if account.others.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "User not found" })));
    }
    (StatusCode::OK, Json(json!({ "message": "User deleted" })))
}

async fn reset_password(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    let mut account = shared.lock().unwrap();
    if let Some(refusal) = admin_refusal(&headers, &account) {
        return refusal;
    }
    account.reset.push(id);
    (StatusCode::OK, Json(json!({ "message": "Password reset" })))
}

async fn start_server(shared: Shared) -> String {
    let app = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/users/me", get(me))
        .route("/players", get(players))
        .route("/me/team", get(get_team).post(post_team))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", delete(delete_user))
        .route("/admin/users/{id}/reset-password", post(reset_password))
        .with_state(shared);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn app_with(roster: &[u64]) -> (Shared, Courtside) {
    app_for(Account {
        roster: roster.to_vec(),
        ..Account::default()
    })
    .await
}

async fn app_for(account: Account) -> (Shared, Courtside) {
    let shared: Shared = Arc::new(Mutex::new(account));
    let base_url = start_server(Arc::clone(&shared)).await;
    let app = Courtside::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client should build");
    (shared, app)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_login_new_user_has_empty_roster_and_zero_score() {
    let (_, app) = app_with(&[]).await;

    let credential = app.login("fan@example.com", "secret").await.unwrap();

    assert_eq!(credential.as_str(), TOKEN);
    let profile = app.current_profile().unwrap();
    assert!(profile.roster.is_empty());
    assert_eq!(profile.total_score, 0.0);
    assert!(!profile.is_admin());
}

#[tokio::test]
async fn test_login_wrong_password_is_invalid_credentials() {
    let (_, app) = app_with(&[]).await;

    let err = app.login("fan@example.com", "nope").await.unwrap_err();

    assert!(matches!(
        err,
        CourtsideError::Auth(AuthError::InvalidCredentials(_))
    ));
    assert!(app.current_profile().is_none());
}

#[tokio::test]
async fn test_register_taken_email_is_rejected() {
    let (_, app) = app_with(&[]).await;

    app.register("rookie@example.com", "pw").await.unwrap();
    let err = app.register("fan@example.com", "pw").await.unwrap_err();

    assert!(matches!(
        err,
        CourtsideError::Auth(AuthError::RegistrationRejected(ref detail)) if detail == "Email already registered"
    ));
}

#[tokio::test]
async fn test_edit_and_save_updates_store_and_profile() {
    let (shared, app) = app_with(&[1]).await;
    app.login("fan@example.com", "secret").await.unwrap();
    let mut catalog = app.catalog();
    catalog.load().await.unwrap();

    let mut editor = app.editor();
    editor.add(PlayerId(2)).unwrap();
    editor.add(PlayerId(3)).unwrap();
    editor.remove(PlayerId(1)).unwrap();
    let profile = editor.save().await.unwrap();

    assert_eq!(shared.lock().unwrap().roster, vec![2, 3]);
    assert_eq!(profile.total_score, 25.0);
    assert_eq!(app.current_profile().unwrap().total_score, 25.0);
    assert_eq!(editor.state(), EditorState::Committed);

    let names: Vec<&str> = catalog
        .resolve(editor.selection().iter())
        .unwrap()
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Player 2", "Player 3"]);

    let stored = app.stored_roster().await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_save_acknowledged_without_roster_commits_and_refreshes() {
    let (shared, app) = app_for(Account {
        ack_only: true,
        ..Account::default()
    })
    .await;
    app.login("fan@example.com", "secret").await.unwrap();
    let mut editor = app.editor();
    for id in 1..=3 {
        editor.add(PlayerId(id)).unwrap();
    }

    let profile = editor.save().await.expect("a 2xx reply is a commit");

    assert_eq!(shared.lock().unwrap().roster, vec![1, 2, 3]);
    assert_eq!(editor.state(), EditorState::Committed);
    assert!(!editor.is_dirty());
    assert_eq!(profile.roster.len(), 3);
    assert_eq!(profile.total_score, 36.0);
    assert_eq!(app.current_profile().unwrap().roster.len(), 3);
}

#[tokio::test]
async fn test_save_unknown_player_keeps_store_unchanged() {
    let (shared, app) = app_with(&[1]).await;
    app.login("fan@example.com", "secret").await.unwrap();
    let mut editor = app.editor();
    editor.add(PlayerId(77)).unwrap();

    let err = editor.save().await.unwrap_err();

    assert!(matches!(err, RosterError::PlayerUnknown(_)));
    assert_eq!(shared.lock().unwrap().roster, vec![1]);
    assert_eq!(shared.lock().unwrap().saves, 0);
    assert!(editor.contains(PlayerId(77)));
}

#[tokio::test]
async fn test_eleventh_player_is_rejected_locally() {
    let (shared, app) = app_with(&[]).await;
    app.login("fan@example.com", "secret").await.unwrap();
    let mut editor = app.editor();
    for id in 1..=MAX_ROSTER_SIZE as u64 {
        editor.add(PlayerId(id)).unwrap();
    }

    let err = editor.add(PlayerId(11)).unwrap_err();

    assert_eq!(err, RosterError::CapacityExceeded { max: 10 });
    assert_eq!(editor.len(), 10);
    assert_eq!(shared.lock().unwrap().saves, 0);
}

#[tokio::test]
async fn test_revoked_token_forces_logout() {
    let (shared, app) = app_with(&[4]).await;
    app.login("fan@example.com", "secret").await.unwrap();
    let mut editor = app.editor();
    shared.lock().unwrap().token_revoked = true;

    let err = app.refresh_profile().await.unwrap_err();

    assert!(err.needs_login());
    assert!(app.current_profile().is_none());
    assert!(!app.session().is_authenticated());
    assert_eq!(
        editor.add(PlayerId(5)),
        Err(RosterError::Auth(AuthError::NoSession))
    );
    assert!(matches!(
        app.stored_roster().await,
        Err(CourtsideError::Auth(AuthError::NoSession))
    ));
}

#[tokio::test]
async fn test_unreachable_api_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = Courtside::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();

    let err = app.login("fan@example.com", "secret").await.unwrap_err();

    assert!(matches!(err, CourtsideError::Auth(AuthError::Network(_))));
}

#[tokio::test]
async fn test_admin_lists_deletes_and_resets_accounts() {
    let (shared, app) = app_for(Account {
        admin: true,
        others: vec![2, 3],
        ..Account::default()
    })
    .await;
    app.login("fan@example.com", "secret").await.unwrap();
    assert!(app.current_profile().unwrap().is_admin());
    let admin = app.admin();

    let users = admin.users().await.unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].role, Role::Admin);

    admin.delete_user(UserId(2)).await.unwrap();
    admin.reset_password(UserId(3)).await.unwrap();
    let missing = admin.delete_user(UserId(2)).await.unwrap_err();

    assert!(matches!(missing, AdminError::UserNotFound(ref detail) if detail == "User not found"));
    assert_eq!(shared.lock().unwrap().others, vec![3]);
    assert_eq!(shared.lock().unwrap().reset, vec![3]);
}

#[tokio::test]
async fn test_admin_as_ordinary_user_is_refused_locally() {
    let (_, app) = app_with(&[]).await;
    app.login("fan@example.com", "secret").await.unwrap();

    let err: CourtsideError = app.admin().users().await.unwrap_err().into();

    assert!(matches!(err, CourtsideError::Admin(AdminError::NotAdmin)));
    assert!(!err.needs_login());
    assert!(app.session().is_authenticated());
}

#[tokio::test]
async fn test_admin_demoted_on_server_expires_session() {
    let (shared, app) = app_for(Account {
        admin: true,
        ..Account::default()
    })
    .await;
    app.login("fan@example.com", "secret").await.unwrap();
    shared.lock().unwrap().admin = false;

    let err = app.admin().users().await.unwrap_err();

    assert_eq!(err, AdminError::Auth(AuthError::SessionExpired));
    assert!(!app.session().is_authenticated());
    assert!(app.current_profile().is_none());
}
