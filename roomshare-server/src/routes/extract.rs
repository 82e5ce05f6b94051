//! Extractors that reject with the JSON error envelope

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use serde::de::DeserializeOwned;

use crate::error::MarketError;

/// JSON request body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(MarketError))]
pub struct ApiJson<T>(pub T);

/// Query-string parameters
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(MarketError))]
pub struct ApiQuery<T>(pub T);

/// JSON body that may be left out entirely
///
/// An empty body reads as `T::default()`; a present body must parse as JSON
/// whatever the content type says.
pub struct OptionalJson<T>(pub T);

impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| MarketError::Validation(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| MarketError::Validation(format!("Invalid JSON body: {}", e)))
    }
}
