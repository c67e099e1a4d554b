//! The JSON envelope wrapped around every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The `{success, data?, message?}` wrapper used by every endpoint.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ApiEnvelope<T> {
    /// Whether the request was handled successfully.
    pub success: bool,

    /// The payload of a successful request, if the endpoint returns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// A human-readable status or error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Render a successful envelope carrying `data`.
pub(crate) fn success<T: Serialize>(status_code: StatusCode, data: T) -> Response {
    (
        status_code,
        Json(ApiEnvelope {
            success: true,
            data: Some(data),
            message: None,
        }),
    )
        .into_response()
}

/// Render a successful envelope carrying only a message.
pub(crate) fn success_message(status_code: StatusCode, message: &str) -> Response {
    (
        status_code,
        Json(ApiEnvelope::<()> {
            success: true,
            data: None,
            message: Some(message.to_owned()),
        }),
    )
        .into_response()
}

/// Render a failed envelope carrying an error message.
pub(crate) fn failure(status_code: StatusCode, message: &str) -> Response {
    (
        status_code,
        Json(ApiEnvelope::<()> {
            success: false,
            data: None,
            message: Some(message.to_owned()),
        }),
    )
        .into_response()
}
