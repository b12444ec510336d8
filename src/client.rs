//! Authenticated API client with automatic token refresh and retry

use crate::credentials::CredentialStore;
use crate::envelope;
use crate::error::{ClientError, Result};
use crate::policy::{self, RecoveryDecision};
use crate::request::{self, ApiRequest, Attempt, FormPart, RequestBody};
use crate::types::{AuthSession, RefreshGrant, RefreshRequest, SessionCredentials};
use async_singleflight::Group;
use reqwest::{header, Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Collaborator hooks for session lifecycle events.
///
/// The real-time channel registers here so its credentials stay in sync
/// with the REST credentials; the host application registers here to learn
/// that the session ended (and, say, present its sign-in surface). The
/// client itself never performs navigation or channel management.
pub trait SessionHooks: Send + Sync + 'static {
    /// Called with the new access token after every successful rotation,
    /// so the real-time channel can reconnect with fresh credentials.
    fn on_access_token_rotated(&self, _access_token: &str) {}

    /// Called once the session is irrecoverable and the stored credentials
    /// have been cleared.
    fn on_session_expired(&self) {}
}

/// No-op hooks for hosts without a real-time channel, and for tests.
pub struct NoopSessionHooks;

impl SessionHooks for NoopSessionHooks {}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Service base URL, e.g. `https://api.savora.example/api/v1`.
    pub base_url: String,

    /// Per-request timeout in seconds. Timeouts surface as transport
    /// errors, never as the token-expiry path. Default: 30 seconds.
    pub timeout_secs: u64,

    /// User-Agent header for outgoing requests.
    pub user_agent: String,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("savora-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Authenticated marketplace API client.
///
/// Attaches the current bearer credentials to every request, and recovers
/// transparently from an expired access token: on a 401 from a non-auth
/// route it refreshes the token once and re-issues the original request,
/// so callers observe the retry's outcome as if it were the original
/// call's result.
pub struct ApiClient {
    base_url: String,
    http: Client,
    credentials: CredentialStore,
    hooks: Arc<dyn SessionHooks>,
    /// Singleflight group so concurrent 401s share one in-flight refresh
    /// instead of issuing parallel refresh calls. Error type is String
    /// because singleflight requires a shared error type.
    refresh_singleflight: Group<String, String>,
}

impl ApiClient {
    /// Create a client with a fresh credential store and no-op hooks.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        Self::with_hooks(config, CredentialStore::new(), Arc::new(NoopSessionHooks))
    }

    /// Create a client around an injected credential store and hooks.
    ///
    /// The store is shared, not owned: the host keeps its own handle and
    /// multiple client instances may observe the same session.
    pub fn with_hooks(
        config: ApiClientConfig,
        credentials: CredentialStore,
        hooks: Arc<dyn SessionHooks>,
    ) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            base_url,
            http,
            credentials,
            hooks,
            refresh_singleflight: Group::new(),
        })
    }

    /// Service base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store backing this client.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Issue a request and return the normalized success payload.
    pub async fn send(&self, request: ApiRequest) -> Result<Value> {
        let mut attempt = Attempt::first(&request);
        loop {
            let response = self.dispatch(&attempt).await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED {
                return finish(response).await;
            }

            let decision = policy::on_unauthorized(
                &request.path,
                attempt.retried,
                self.credentials.refresh_token().is_some(),
            );
            debug!(path = %request.path, decision = ?decision, "request unauthorized");

            match decision {
                RecoveryDecision::Surface => return finish(response).await,
                RecoveryDecision::EndSession => {
                    self.end_session("no refresh token available");
                    return finish(response).await;
                }
                RecoveryDecision::Refresh => {
                    self.refresh_access_token().await?;
                    attempt = attempt.into_retry();
                }
            }
        }
    }

    /// `send` plus typed deserialization of the payload.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let payload = self.send(request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::new(Method::POST, path).json(body)?)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::new(Method::PUT, path).json(body)?)
            .await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::new(Method::PATCH, path).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Upload a multipart form. The transport supplies the content-type
    /// header so the boundary is always correct.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T> {
        self.execute(ApiRequest::new(Method::POST, path).multipart(parts))
            .await
    }

    async fn dispatch(&self, attempt: &Attempt<'_>) -> Result<reqwest::Response> {
        let request = self.assemble(attempt.request)?;
        debug!(
            method = %attempt.request.method,
            path = %attempt.request.path,
            retried = attempt.retried,
            "dispatching request"
        );
        Ok(self.http.execute(request).await?)
    }

    /// Build the transport request from a descriptor. The Authorization
    /// header is read from the store at assemble time, so a post-refresh
    /// retry naturally carries the rotated token.
    fn assemble(&self, request: &ApiRequest) -> Result<reqwest::Request> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // Auth routes authenticate with the submitted credentials, not the
        // session bearer token.
        if !policy::is_auth_route(&request.path) {
            if let Some(token) = self.credentials.access_token() {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(request::to_form(parts)?),
        };

        Ok(builder.build()?)
    }

    /// Exchange the refresh token for a new access token, deduplicating
    /// concurrent attempts through the singleflight group.
    async fn refresh_access_token(&self) -> Result<String> {
        let key = "session-refresh".to_string();
        let (token, error, _shared) = self
            .refresh_singleflight
            .work(&key, async {
                match self.do_refresh().await {
                    Ok(token) => Ok(token),
                    Err(e) => {
                        let message = match e {
                            ClientError::SessionExpired(inner) => inner,
                            other => other.to_string(),
                        };
                        warn!(error = %message, "token refresh failed");
                        self.end_session(&message);
                        Err(message)
                    }
                }
            })
            .await;

        match (token, error) {
            (Some(token), None) => Ok(token),
            (None, Some(message)) => Err(ClientError::SessionExpired(message)),
            _ => Err(ClientError::SessionExpired(
                "refresh failed in a concurrent attempt".to_string(),
            )),
        }
    }

    /// The refresh exchange itself. Issued as a bare call so it can never
    /// recurse into the 401 recovery path.
    async fn do_refresh(&self) -> Result<String> {
        let refresh_token = self
            .credentials
            .refresh_token()
            .ok_or_else(|| ClientError::SessionExpired("no refresh token available".into()))?;

        let url = format!("{}/auth/refresh", self.base_url);
        debug!("exchanging refresh token for a new access token");

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::SessionExpired(format!(
                "refresh rejected with status {status}: {text}"
            )));
        }

        let body: Value = response.json().await?;
        let grant: RefreshGrant = serde_json::from_value(envelope::normalize_success(body)?)?;

        self.credentials.rotate_access_token(&grant.access_token);
        info!("access token rotated");
        self.hooks.on_access_token_rotated(&grant.access_token);

        Ok(grant.access_token)
    }

    /// Adopt freshly issued tokens (login/register) and bring the
    /// real-time channel along.
    pub(crate) fn adopt_session(&self, session: &AuthSession) {
        self.credentials.set(SessionCredentials::new(
            session.access_token.as_str(),
            session.refresh_token.as_str(),
        ));
        self.hooks.on_access_token_rotated(&session.access_token);
    }

    fn end_session(&self, reason: &str) {
        warn!(reason = %reason, "clearing session credentials");
        self.credentials.clear();
        self.hooks.on_session_expired();
    }
}

/// Read the response body and split it into the success or error shape.
async fn finish(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if status.is_success() {
        return envelope::normalize_success(body);
    }

    let (message, details) = envelope::error_from_response(status.as_u16(), &body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(credentials: SessionCredentials) -> ApiClient {
        ApiClient::with_hooks(
            ApiClientConfig::new("https://api.savora.test/api/v1/"),
            CredentialStore::with_credentials(credentials),
            Arc::new(NoopSessionHooks),
        )
        .unwrap()
    }

    #[test]
    fn base_url_loses_the_trailing_slash() {
        let client = client_with(SessionCredentials::default());
        assert_eq!(client.base_url(), "https://api.savora.test/api/v1");
    }

    #[test]
    fn empty_base_url_is_a_configuration_error() {
        let result = ApiClient::new(ApiClientConfig::new(""));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn bearer_token_round_trips_through_assembly() {
        let client = client_with(SessionCredentials::new("tok-123", "refresh"));

        let request = client
            .assemble(&ApiRequest::new(Method::GET, "/orders"))
            .unwrap();

        let authorization = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(authorization, "Bearer tok-123");
    }

    #[test]
    fn auth_routes_are_assembled_without_a_bearer() {
        let client = client_with(SessionCredentials::new("tok-123", "refresh"));

        let request = client
            .assemble(&ApiRequest::new(Method::POST, "/auth/login"))
            .unwrap();

        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn per_call_headers_are_applied() {
        let client = client_with(SessionCredentials::default());

        let request = client
            .assemble(&ApiRequest::new(Method::GET, "/orders").header("X-Request-Id", "abc"))
            .unwrap();

        assert_eq!(
            request.headers().get("X-Request-Id").unwrap(),
            &header::HeaderValue::from_static("abc")
        );
    }

    #[test]
    fn multipart_body_lets_the_transport_set_the_boundary() {
        let client = client_with(SessionCredentials::default());

        let request = client
            .assemble(
                &ApiRequest::new(Method::POST, "/vendors/logo").multipart(vec![
                    FormPart::file("logo", "logo.png", "image/png", vec![1, 2, 3]),
                ]),
            )
            .unwrap();

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }
}
