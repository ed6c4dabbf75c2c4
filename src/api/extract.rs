//! Request extractors that reject with [`ApiErrorResponse`].
//!
//! Path identifiers are validated in a parts extractor, so a malformed id is
//! answered with 400 before the body is read or the store is touched.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiErrorResponse;
use crate::domain::{ObjectId, ProjectId};

// =============================================================================
// ValidProjectId
// =============================================================================

/// A `{project_id}` path segment that has the shape of a store identifier.
///
/// Keeps the segment as sent so responses can echo it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProjectId {
    project_id: ProjectId,
    raw: String,
}

impl ValidProjectId {
    /// Validates a raw path segment.
    ///
    /// # Errors
    ///
    /// Returns the 400 invalid-id response when `raw` is not 24 hex characters.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ApiErrorResponse> {
        let raw = raw.into();
        if !ObjectId::is_valid(&raw) {
            return Err(ApiErrorResponse::invalid_id());
        }
        let project_id = ProjectId::parse_str(&raw).map_err(|_| ApiErrorResponse::invalid_id())?;
        Ok(Self { project_id, raw })
    }

    /// Returns the parsed identifier.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the path segment as the client sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl<State> FromRequestParts<State> for ValidProjectId
where
    State: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &State) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiErrorResponse::invalid_id())?;
        Self::parse(raw)
    }
}

// =============================================================================
// ValidJson
// =============================================================================

/// JSON body extractor whose rejection uses the API error body.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorResponse))]
pub struct ValidJson<T>(pub T);

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        Self::new(
            rejection.status(),
            super::error::ApiError::new("INVALID_BODY", rejection.body_text()),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
