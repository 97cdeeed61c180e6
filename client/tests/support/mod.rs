//! In-process WORK360 backend used by the integration tests.
//!
//! Serves the real wire contract on a random local port: enveloped JSON
//! bodies, bearer-token auth with signature and expiry checks, and the
//! fixed dataset of one small company (Mario the owner, Luigi the worker,
//! two construction sites). Per-endpoint knobs let a test inject failures
//! and latency.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use client::auth::Role;
use client::utils::jwt::Claims;

const SECRET: &str = "work360-test-secret";

/// A user account known to the mock backend.
#[derive(Clone)]
pub struct MockUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub company_id: i64,
    pub company_name: String,
}

impl MockUser {
    fn profile_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "role": self.role.to_string(),
            "companyId": self.company_id,
            "companyName": self.company_name
        })
    }
}

fn seed_user(
    id: &str,
    username: &str,
    password: &str,
    role: Role,
    first_name: &str,
    last_name: &str,
) -> MockUser {
    MockUser {
        id: id.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        email: format!("{}@rossicostruzioni.it", username),
        role,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        company_id: 1,
        company_name: "Rossi Costruzioni".to_string(),
    }
}

/// Shared state behind the mock routes: the user accounts, hit counters,
/// the last bearer header seen on `/auth/me`, and the failure and latency
/// knobs.
pub struct BackendState {
    users: Mutex<Vec<MockUser>>,
    pub me_hits: AtomicUsize,
    pub summary_hits: AtomicUsize,
    pub sites_hits: AtomicUsize,
    pub report_hits: AtomicUsize,
    pub last_bearer: Mutex<Option<String>>,
    pub me_failure: Mutex<Option<u16>>,
    pub me_delay: Mutex<Option<Duration>>,
    pub summary_failure: Mutex<Option<u16>>,
    pub report_delay: Mutex<Option<Duration>>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            users: Mutex::new(vec![
                seed_user("u-mario", "mario", "segreto8", Role::Owner, "Mario", "Rossi"),
                seed_user("u-luigi", "luigi", "attrezzi9", Role::Worker, "Luigi", "Bianchi"),
            ]),
            me_hits: AtomicUsize::new(0),
            summary_hits: AtomicUsize::new(0),
            sites_hits: AtomicUsize::new(0),
            report_hits: AtomicUsize::new(0),
            last_bearer: Mutex::new(None),
            me_failure: Mutex::new(None),
            me_delay: Mutex::new(None),
            summary_failure: Mutex::new(None),
            report_delay: Mutex::new(None),
        }
    }

    fn mint(&self, sub: &str, role: Option<Role>, expires_in_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            role,
            exp: (now + expires_in_secs).max(0) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<Claims, (StatusCode, Json<Value>)> {
        let token = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| err_envelope(StatusCode::UNAUTHORIZED, "Token mancante"))?;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| err_envelope(StatusCode::UNAUTHORIZED, "Token non valido"))
    }
}

/// Handle to a running mock backend. The server task is aborted on drop.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Binds a fresh backend on a random local port.
    pub async fn start() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let state = Arc::new(BackendState::new());
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Mints a token this backend will accept.
    pub fn token_for(&self, sub: &str, role: Option<Role>, expires_in_secs: i64) -> String {
        self.state.mint(sub, role, expires_in_secs)
    }

    /// Mints a well-formed token signed with a different secret, as left
    /// behind by a password reset or another deployment.
    pub fn foreign_token(&self, sub: &str, role: Option<Role>) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            role,
            exp: (now + 3600) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/sites", get(sites))
        .route("/dashboard/summary", get(summary))
        .route("/sites/{id}/report", get(site_report))
        .with_state(state)
}

fn ok_envelope(data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": "ok"
    }))
}

fn err_envelope(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "error": { "errorType": "ApiError" }
        })),
    )
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    username: String,
    password: String,
    email: String,
    first_name: String,
    last_name: String,
    #[serde(default)]
    phone: Option<String>,
    company_name: String,
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (token, profile) = {
        let users = state.users.lock().unwrap();
        let user = users
            .iter()
            .find(|user| user.username == body.username && user.password == body.password)
            .ok_or_else(|| err_envelope(StatusCode::UNAUTHORIZED, "Credenziali non valide"))?;
        (
            state.mint(&user.id, Some(user.role), 3600),
            user.profile_json(),
        )
    };

    Ok(ok_envelope(json!({
        "token": token,
        "user": profile
    })))
}

async fn register(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut users = state.users.lock().unwrap();
    if users.iter().any(|user| user.username == body.username) {
        return Err(err_envelope(StatusCode::CONFLICT, "Username già in uso"));
    }

    let user = MockUser {
        id: format!("u-{}", body.username),
        username: body.username,
        password: body.password,
        email: body.email,
        role: Role::Owner,
        first_name: body.first_name,
        last_name: body.last_name,
        company_id: 99,
        company_name: body.company_name,
    };
    let token = state.mint(&user.id, Some(Role::Owner), 3600);
    let profile = user.profile_json();
    users.push(user);

    Ok(ok_envelope(json!({
        "token": token,
        "user": profile
    })))
}

async fn me(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.me_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_bearer.lock().unwrap() = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let delay = *state.me_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = *state.me_failure.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err(err_envelope(status, "Errore interno"));
    }

    let claims = state.authorize(&headers)?;
    let profile = {
        let users = state.users.lock().unwrap();
        users
            .iter()
            .find(|user| user.id == claims.sub)
            .map(MockUser::profile_json)
            .ok_or_else(|| err_envelope(StatusCode::UNAUTHORIZED, "Utente sconosciuto"))?
    };
    Ok(ok_envelope(profile))
}

async fn sites(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.sites_hits.fetch_add(1, Ordering::SeqCst);
    state.authorize(&headers)?;

    Ok(ok_envelope(json!([
        {
            "id": 1,
            "name": "Ristrutturazione Via Roma 12",
            "address": "Via Roma 12, Milano",
            "clientName": "Condominio Via Roma",
            "status": "active",
            "progressPercent": 45.0,
            "openedOn": "2026-03-02"
        },
        {
            "id": 2,
            "name": "Villetta Arese",
            "address": "Via Manzoni 3, Arese",
            "clientName": "Famiglia Colombo",
            "status": "suspended",
            "progressPercent": 80.0,
            "openedOn": "2025-11-17"
        }
    ])))
}

async fn summary(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.summary_hits.fetch_add(1, Ordering::SeqCst);
    state.authorize(&headers)?;

    if let Some(status) = *state.summary_failure.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err(err_envelope(status, "Errore interno"));
    }

    Ok(ok_envelope(json!({
        "activeSites": 2,
        "workersOnSite": 5,
        "hoursThisMonth": 340.5,
        "materialsCostMonth": 12850.0,
        "pendingQuotes": 3,
        "quotesValue": 95000.0,
        "openSalAmount": 18000.0
    })))
}

async fn site_report(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.report_hits.fetch_add(1, Ordering::SeqCst);
    state.authorize(&headers)?;

    let delay = *state.report_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if !(1..=2).contains(&id) {
        return Err(err_envelope(StatusCode::NOT_FOUND, "Cantiere non trovato"));
    }

    Ok(ok_envelope(json!({
        "siteId": id,
        "hoursTotal": 80.0 * id as f64,
        "hoursByWorker": [
            { "userId": "u-luigi", "name": "Luigi Bianchi", "hours": 40.0 * id as f64 }
        ],
        "materialsCost": 1500.0 * id as f64,
        "materialsEntries": 4,
        "attendanceDays": 10,
        "quotedAmount": 50000.0,
        "billedAmount": 20000.0
    })))
}
