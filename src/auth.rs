//! Auth endpoint methods
//!
//! These routes authenticate with the credentials in the request body, so
//! a 401 from any of them means "wrong credentials" and is surfaced
//! verbatim rather than triggering a token refresh.

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{
    AuthSession, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    VerifyEmailRequest, VerifyPhoneRequest,
};
use reqwest::Method;
use serde_json::Value;
use tracing::info;

impl ApiClient {
    /// Sign in with email and password, storing the issued tokens.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession> {
        let session: AuthSession = self
            .execute(ApiRequest::new(Method::POST, "/auth/login").json(request)?)
            .await?;
        self.adopt_session(&session);
        info!("signed in");
        Ok(session)
    }

    /// Create an account, storing the issued tokens.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession> {
        let session: AuthSession = self
            .execute(ApiRequest::new(Method::POST, "/auth/register").json(request)?)
            .await?;
        self.adopt_session(&session);
        info!("account registered");
        Ok(session)
    }

    /// Drop the stored credentials. Bearer sessions keep no server-side
    /// state, so logout is purely local.
    pub fn logout(&self) {
        self.credentials().clear();
        info!("signed out");
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<Value> {
        self.post("/auth/forgot-password", request).await
    }

    /// Complete a password reset with the emailed token.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Value> {
        self.post("/auth/reset-password", request).await
    }

    /// Confirm an email address.
    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<Value> {
        self.post("/auth/verify-email", request).await
    }

    /// Confirm a phone number with the SMS code.
    pub async fn verify_phone(&self, request: &VerifyPhoneRequest) -> Result<Value> {
        self.post("/auth/verify-phone", request).await
    }
}
