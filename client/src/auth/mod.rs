//! Authentication module for session state, credential storage, and access roles.
//!
//! This module provides the public interface for authentication-related
//! functionality such as login, registration, the optimistic token check,
//! and the persisted credential store.

pub mod models;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use models::{AuthState, LoginRequest, RegisterRequest, Role, Session, SessionOrigin};
pub use service::AuthService;
pub use store::{CredentialStore, FileStore, MemoryStore};
