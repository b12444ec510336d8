//! Unauthorized-response recovery policy
//!
//! Pure decision logic for the 401 handling path, kept free of any
//! transport concerns so it can be exercised without a network.

/// Routes whose 401 means "the submitted credentials are wrong", never
/// "a previously valid session expired". A 401 from any of these must be
/// surfaced verbatim and must not trigger a refresh.
pub const AUTH_ROUTES: [&str; 6] = [
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/auth/verify-email",
    "/auth/verify-phone",
];

/// Whether `path` belongs to the credential-checking auth route family.
///
/// Matches on segment boundaries: `/auth/login/extra` is an auth route,
/// `/auth/login-attempts` is not.
pub fn is_auth_route(path: &str) -> bool {
    AUTH_ROUTES.iter().any(|route| {
        path == *route
            || path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// What to do with a request that came back 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryDecision {
    /// Surface the 401 to the caller as-is.
    Surface,
    /// The session cannot be recovered: clear it, then surface the 401.
    EndSession,
    /// Exchange the refresh token for a new access token and retry once.
    Refresh,
}

/// Transition function for the unauthorized-recovery state machine.
pub fn on_unauthorized(
    path: &str,
    already_retried: bool,
    has_refresh_token: bool,
) -> RecoveryDecision {
    if is_auth_route(path) {
        return RecoveryDecision::Surface;
    }
    if already_retried {
        // One retry per request; a second 401 would loop forever.
        return RecoveryDecision::Surface;
    }
    if !has_refresh_token {
        return RecoveryDecision::EndSession;
    }
    RecoveryDecision::Refresh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_routes_match_exactly() {
        for route in AUTH_ROUTES {
            assert!(is_auth_route(route), "{route} should match");
        }
    }

    #[test]
    fn auth_routes_match_on_segment_boundaries() {
        assert!(is_auth_route("/auth/login/otp"));
        assert!(!is_auth_route("/auth/login-attempts"));
        assert!(!is_auth_route("/auth/refresh"));
        assert!(!is_auth_route("/orders"));
        assert!(!is_auth_route("/vendors/auth/login"));
    }

    #[test]
    fn auth_route_401_is_surfaced() {
        assert_eq!(
            on_unauthorized("/auth/login", false, true),
            RecoveryDecision::Surface
        );
    }

    #[test]
    fn already_retried_request_is_surfaced() {
        assert_eq!(
            on_unauthorized("/orders", true, true),
            RecoveryDecision::Surface
        );
    }

    #[test]
    fn missing_refresh_token_ends_the_session() {
        assert_eq!(
            on_unauthorized("/orders", false, false),
            RecoveryDecision::EndSession
        );
    }

    #[test]
    fn recoverable_401_triggers_refresh() {
        assert_eq!(
            on_unauthorized("/orders", false, true),
            RecoveryDecision::Refresh
        );
    }
}
