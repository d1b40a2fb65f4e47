use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::StatusCode,
};
use serde_json::{Map, Value};

use crate::error::{ApiError, NON_FIELD_ERRORS};

/// Request body as loose JSON.
///
/// An empty body reads as `{}` so missing fields are reported per field.
/// Malformed JSON becomes a 400 with a `non_field_errors` entry instead of
/// axum's plain-text rejection. Bodies over the size limit keep their 413.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::validation(NON_FIELD_ERRORS, format!("JSON parse error - {}", e)))
    }
}

fn rejection_to_error(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Rejecting oversized body: {}", rejection.body_text());
        return ApiError::PayloadTooLarge("Request body exceeds the size limit.".to_string());
    }
    ApiError::validation(NON_FIELD_ERRORS, rejection.body_text())
}
