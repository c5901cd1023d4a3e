//! Custom Axum extractors.

use crate::middleware::header_correlation_id;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Correlation id of the current request.
///
/// Set by the correlation-id middleware; without it, taken from the
/// `X-Correlation-ID` header or freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        Ok(Self(
            header_correlation_id(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}
