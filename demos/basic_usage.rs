//! Basic client walkthrough
//!
//! Usage:
//!   cargo run --example basic_usage

use std::sync::Arc;

use savora_client::{
    ApiClient, ApiClientConfig, CredentialStore, LoginRequest, SessionHooks,
};
use serde_json::Value;

/// Stand-in for the real-time channel: in the full application this is
/// where the socket reconnects with the rotated token.
struct LoggingHooks;

impl SessionHooks for LoggingHooks {
    fn on_access_token_rotated(&self, access_token: &str) {
        println!("  [hook] real-time channel reconnecting (token {}...)", &access_token[..access_token.len().min(12)]);
    }

    fn on_session_expired(&self) {
        println!("  [hook] session expired, returning to sign-in");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("SAVORA_API_URL")
        .unwrap_or_else(|_| "http://localhost:5000/api/v1".to_string());
    let email = std::env::var("SAVORA_EMAIL").unwrap_or_else(|_| "demo@example.com".to_string());
    let password = std::env::var("SAVORA_PASSWORD").unwrap_or_else(|_| "password123".to_string());

    println!("=== Savora Client Example ===");
    println!("API: {base_url}");
    println!();

    let store = CredentialStore::new();
    let client = ApiClient::with_hooks(
        ApiClientConfig::new(&base_url),
        store.clone(),
        Arc::new(LoggingHooks),
    )?;
    println!("✓ Client created");

    // Sign in; the issued tokens land in the shared store.
    println!("Signing in as {email}...");
    match client.login(&LoginRequest { email, password }).await {
        Ok(session) => {
            println!("✓ Signed in");
            if let Some(user) = &session.user {
                println!("  Profile: {user}");
            }
        }
        Err(e) => {
            println!("! Sign-in failed: {}", e.normalized().message);
            println!("  (This is expected if no API is running at {base_url})");
            return Ok(());
        }
    }

    // An authenticated call. If the access token has expired by the time
    // this runs, the client refreshes and retries behind the scenes.
    println!("Fetching profile...");
    match client.get::<Value>("/users/me").await {
        Ok(profile) => println!("✓ Profile: {profile}"),
        Err(e) => println!("! Request failed: {}", e.normalized().message),
    }

    println!("Authenticated: {}", store.is_authenticated());

    client.logout();
    println!("✓ Signed out");

    Ok(())
}
