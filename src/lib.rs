//! Savora Marketplace API Client
//!
//! A Rust client library for the Savora food-delivery marketplace REST API,
//! with automatic bearer authentication, transparent token refresh on
//! expiry, and single-flight retry coordination.
//!
//! On a 401 from a non-auth route the client exchanges the stored refresh
//! token for a new access token, notifies the real-time channel through
//! [`SessionHooks`], and re-issues the original request exactly once.
//! Callers observe the retry's outcome as if it were the original call.

pub mod auth;
pub mod client;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod policy;
pub mod request;
pub mod types;

pub use client::{ApiClient, ApiClientConfig, NoopSessionHooks, SessionHooks};
pub use reqwest::Method;
pub use credentials::CredentialStore;
pub use envelope::NormalizedError;
pub use error::{ClientError, Result};
pub use request::{ApiRequest, FormPart, RequestBody};
pub use types::{
    AccountRole, AuthSession, LoginRequest, RegisterRequest, SessionCredentials,
};
