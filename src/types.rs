//! Wire types for the marketplace API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials for the current session (access + refresh).
///
/// Either token may be absent: a fresh store holds neither, and a session
/// restored from an external source may carry only one of the pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionCredentials {
    /// Build credentials with both tokens present.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest {
    pub refresh_token: String,
}

/// Payload of a successful refresh, after the response envelope is unwrapped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshGrant {
    pub access_token: String,
}

/// Account role on the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    #[default]
    Customer,
    Vendor,
    Admin,
}

/// Credentials submitted to `/auth/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// New-account payload for `/auth/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: AccountRole,
}

/// Tokens and profile returned by `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Profile payload as sent by the server; its shape varies by role.
    #[serde(default)]
    pub user: Option<Value>,
}

/// Body of `/auth/forgot-password`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body of `/auth/reset-password`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Body of `/auth/verify-email`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Body of `/auth/verify-phone`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPhoneRequest {
    pub phone: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_uses_camel_case() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "refresh-123".to_string(),
        })
        .unwrap();

        assert_eq!(body, serde_json::json!({ "refreshToken": "refresh-123" }));
    }

    #[test]
    fn auth_session_parses_without_user() {
        let session: AuthSession = serde_json::from_value(serde_json::json!({
            "accessToken": "a",
            "refreshToken": "r",
        }))
        .unwrap();

        assert_eq!(session.access_token, "a");
        assert_eq!(session.refresh_token, "r");
        assert!(session.user.is_none());
    }

    #[test]
    fn account_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(AccountRole::Vendor).unwrap(),
            serde_json::json!("vendor")
        );
    }
}
