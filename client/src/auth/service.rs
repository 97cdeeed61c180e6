//! Business logic for the session lifecycle.
//!
//! Owns the single authoritative `AuthState` and publishes every change
//! through a watch channel. The lifecycle is optimistic: a locally stored
//! token establishes a session immediately, then `/auth/me` confirms or
//! corrects it. Only a definitive credential rejection tears the session
//! down; transient failures keep it and mark the connection degraded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::BackendApi;
use crate::api::models::AuthPayload;
use crate::auth::models::{AuthState, LoginRequest, RegisterRequest, Session};
use crate::auth::store::CredentialStore;
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt;

/// Service for authentication and session state.
pub struct AuthService {
    api: Arc<dyn BackendApi>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<AuthState>,
    /// Monotonic pass counter. A pass may only publish while it is still
    /// the latest; login, logout and newer checks advance it so a slow
    /// reconciliation cannot clobber fresher state.
    epoch: AtomicU64,
}

impl AuthService {
    pub fn new(api: Arc<dyn BackendApi>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            state: watch::Sender::new(AuthState::default()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns a receiver that observes every published `AuthState`.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn begin_pass(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn pass_is_current(&self, pass: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == pass
    }

    fn publish_if_current(&self, pass: u64, state: AuthState) {
        if self.pass_is_current(pass) {
            self.state.send_replace(state);
        }
    }

    /// Establishes the session from the stored token, then reconciles it
    /// against the backend.
    ///
    /// Publishes up to three states: `checking` raised, the optimistic
    /// session decoded from the token, and the outcome. Safe to call
    /// repeatedly; a rerun while a previous call is still awaiting the
    /// backend supersedes it.
    pub async fn check_auth(&self) {
        let pass = self.begin_pass();
        self.state.send_modify(|state| state.checking = true);

        let Some(token) = self.store.load_token().await else {
            debug!("no stored token, starting anonymous");
            self.publish_if_current(pass, AuthState::default());
            return;
        };

        let claims = match jwt::decode_unverified(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("stored token is unreadable, discarding it: {}", e);
                if self.pass_is_current(pass) {
                    self.store.clear_token().await;
                    self.publish_if_current(pass, AuthState::default());
                }
                return;
            }
        };

        if claims.is_expired() {
            info!("stored token has expired, discarding it");
            if self.pass_is_current(pass) {
                self.store.clear_token().await;
                self.publish_if_current(pass, AuthState::default());
            }
            return;
        }

        // Token is plausible: show the user as signed in right away and
        // confirm in the background. The role claim may be missing on old
        // tokens, in which case the last role the server returned fills in.
        let fallback_role = self.store.load_role().await;
        let optimistic = Session::from_claims(&claims, fallback_role);
        if !self.pass_is_current(pass) {
            return;
        }
        self.state.send_modify(|state| {
            state.session = Some(optimistic.clone());
        });

        match self.api.me().await {
            Ok(profile) => {
                if self.pass_is_current(pass) {
                    let session = Session::from_profile(profile, Some(optimistic.role));
                    if session.role.is_known() {
                        self.store.store_role(session.role).await;
                    }
                    info!("session confirmed for user {}", session.user_id);
                    self.publish_if_current(
                        pass,
                        AuthState {
                            session: Some(session),
                            checking: false,
                            degraded: false,
                        },
                    );
                }
            }
            Err(e) if e.is_auth_rejection() => {
                warn!("token rejected by the backend: {}", e);
                if self.pass_is_current(pass) {
                    self.store.clear_token().await;
                    self.publish_if_current(pass, AuthState::default());
                }
            }
            Err(e) => {
                warn!("profile check failed, keeping optimistic session: {}", e);
                self.publish_if_current(
                    pass,
                    AuthState {
                        session: Some(optimistic),
                        checking: false,
                        degraded: true,
                    },
                );
            }
        }
    }

    /// Re-runs the auth check after a connectivity failure.
    pub async fn retry_auth(&self) {
        debug!("retrying auth check");
        self.check_auth().await;
    }

    /// Authenticates with username and password.
    ///
    /// On success the session is installed and published; on failure the
    /// current state is left untouched and the error is returned for the
    /// form to display.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<Session> {
        if let Err(validation_errors) = login_request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        match self.api.login(&login_request).await {
            Ok(granted) => Ok(self.install_session(granted).await),
            Err(e) => {
                warn!("login failed for {}: {}", login_request.username, e);
                Err(e.into())
            }
        }
    }

    /// Registers a new company account and signs its owner in.
    pub async fn register(&self, register_request: RegisterRequest) -> ServiceResult<Session> {
        if let Err(validation_errors) = register_request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        match self.api.register(&register_request).await {
            Ok(granted) => Ok(self.install_session(granted).await),
            Err(e) => {
                warn!("registration failed for {}: {}", register_request.username, e);
                Err(e.into())
            }
        }
    }

    /// Discards the session and every stored credential.
    pub async fn logout(&self) {
        self.begin_pass();
        self.store.clear_token().await;
        self.store.clear_role().await;
        info!("session closed");
        self.state.send_replace(AuthState::default());
    }

    /// Stores the granted token and publishes the authoritative session.
    async fn install_session(&self, granted: AuthPayload) -> Session {
        self.begin_pass();
        self.store.store_token(&granted.token).await;
        let session = Session::from_profile(granted.user, None);
        if session.role.is_known() {
            self.store.store_role(session.role).await;
        }
        info!("session established for user {}", session.user_id);
        self.state.send_replace(AuthState {
            session: Some(session.clone()),
            checking: false,
            degraded: false,
        });
        session
    }
}
