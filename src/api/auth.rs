//! Authentication gate.
//!
//! Mutating project routes require a credential accepted by the configured
//! [`Authenticator`]. The gate only answers pass or fail; there is no notion
//! of users or roles.
//!
//! # Environment Variables
//!
//! - `AUTH_TOKENS`: comma-separated bearer tokens accepted by the gate
//! - `REQUIRE_AUTH_FOR_TASK_CREATE`: gate `POST /api/tasks` as well (default: off)

use std::collections::HashSet;
use std::env;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::infrastructure::{ConfigurationError, parse_flag};

// =============================================================================
// Authenticator
// =============================================================================

/// A pass/fail check over request credentials.
pub trait Authenticator: Send + Sync {
    /// Returns true if `credentials` grant access.
    fn authenticate(&self, credentials: &str) -> bool;
}

/// Accepts a fixed set of bearer tokens.
///
/// An authenticator with no tokens rejects everything.
#[derive(Debug, Clone, Default)]
pub struct BearerTokenAuthenticator {
    tokens: HashSet<String>,
}

impl BearerTokenAuthenticator {
    /// Creates an authenticator accepting the given tokens.
    ///
    /// Empty and whitespace-only tokens are ignored.
    #[must_use]
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// Reads accepted tokens from `AUTH_TOKENS`.
    #[must_use]
    pub fn from_env() -> Self {
        env::var("AUTH_TOKENS")
            .map(|value| Self::new(value.split(',')))
            .unwrap_or_default()
    }

    /// Returns the number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn authenticate(&self, credentials: &str) -> bool {
        self.tokens.contains(credentials)
    }
}

// =============================================================================
// AuthPolicy
// =============================================================================

/// Which routes outside the project mutations go through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthPolicy {
    /// Whether `POST /api/tasks` requires authentication.
    pub require_auth_for_task_create: bool,
}

impl AuthPolicy {
    /// Reads the policy from `REQUIRE_AUTH_FOR_TASK_CREATE`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidFlag` for an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let require_auth_for_task_create = match env::var("REQUIRE_AUTH_FOR_TASK_CREATE") {
            Ok(value) => parse_flag("REQUIRE_AUTH_FOR_TASK_CREATE", &value)?,
            Err(_) => false,
        };
        Ok(Self {
            require_auth_for_task_create,
        })
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Runs the authentication gate over request headers.
///
/// # Errors
///
/// Returns a 401 [`ApiErrorResponse`] when the token is missing or refused.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiErrorResponse> {
    let Some(token) = bearer_token(headers) else {
        tracing::debug!("Rejected request without bearer token");
        return Err(ApiErrorResponse::unauthorized("No authorization token was found"));
    };

    if state.authenticator.authenticate(token) {
        Ok(())
    } else {
        tracing::debug!("Rejected request with unknown bearer token");
        Err(ApiErrorResponse::unauthorized("Invalid authorization token"))
    }
}

/// Extractor that admits only authenticated requests.
///
/// Handlers list it first so a refused request never reaches the store.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(state, &parts.headers).map(|()| Self)
    }
}

/// Extractor for task creation: authenticates only when the policy says so.
#[derive(Debug, Clone, Copy)]
pub struct TaskCreationGate;

impl FromRequestParts<AppState> for TaskCreationGate {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.auth_policy.require_auth_for_task_create {
            authorize(state, &parts.headers)?;
        }
        Ok(Self)
    }
}

// =============================================================================
// Tests
// =============================================================================
