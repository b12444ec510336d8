//! Thread-safe credential storage

use crate::types::SessionCredentials;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Store for the current session's access and refresh tokens.
///
/// Cloning yields a handle to the same underlying session, so the host
/// application, the API client, and tests can share one store without
/// ambient global state. Reads are lock-free; every outgoing request reads
/// the access token and only the refresh step and the auth endpoints write.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    credentials: Arc<ArcSwap<SessionCredentials>>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with credentials.
    pub fn with_credentials(credentials: SessionCredentials) -> Self {
        let store = Self::new();
        store.set(credentials);
        store
    }

    /// Replace the stored credentials.
    pub fn set(&self, credentials: SessionCredentials) {
        self.credentials.store(Arc::new(credentials));
    }

    /// Snapshot of the current credentials.
    pub fn get(&self) -> SessionCredentials {
        let guard = self.credentials.load();
        (**guard).clone()
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.credentials.load().access_token.clone()
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.credentials.load().refresh_token.clone()
    }

    /// Replace the access token after a refresh, keeping the refresh token.
    pub fn rotate_access_token(&self, access_token: &str) {
        self.credentials.rcu(|current| SessionCredentials {
            access_token: Some(access_token.to_string()),
            refresh_token: current.refresh_token.clone(),
        });
    }

    /// Drop both tokens.
    pub fn clear(&self) {
        self.credentials.store(Arc::new(SessionCredentials::default()));
    }

    /// Whether an access token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.load().access_token.is_some()
    }
}
