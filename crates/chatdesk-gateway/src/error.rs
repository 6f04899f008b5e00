// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-status mapping for the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatdesk_core::ChatdeskError;
use serde::Serialize;
use tracing::error;

/// Wire error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Set only for partial provisioning failures: the credential id an
    /// operator needs to remove by hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphaned_credential: Option<String>,
}

/// Newtype so `?` works in handlers returning `Result<_, ApiError>`.
#[derive(Debug)]
pub struct ApiError(pub ChatdeskError);

impl From<ChatdeskError> for ApiError {
    fn from(e: ChatdeskError) -> Self {
        ApiError(e)
    }
}

/// Map a domain error to an HTTP status.
pub fn status_for(error: &ChatdeskError) -> StatusCode {
    match error {
        ChatdeskError::Invalid(_) => StatusCode::BAD_REQUEST,
        ChatdeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ChatdeskError::Forbidden(_) => StatusCode::FORBIDDEN,
        ChatdeskError::NotFound { .. } => StatusCode::NOT_FOUND,
        ChatdeskError::Conflict(_) => StatusCode::CONFLICT,
        ChatdeskError::Notify { .. } => StatusCode::BAD_GATEWAY,
        ChatdeskError::Config(_)
        | ChatdeskError::Storage { .. }
        | ChatdeskError::Provisioning { .. }
        | ChatdeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let orphaned_credential = match &self.0 {
            ChatdeskError::Provisioning {
                orphaned_credential, ..
            } => orphaned_credential.clone(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            orphaned_credential,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(
            status_for(&ChatdeskError::Invalid("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ChatdeskError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ChatdeskError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ChatdeskError::NotFound { what: "x".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ChatdeskError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ChatdeskError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn provisioning_body_carries_orphan_id() {
        let api_error = ApiError(ChatdeskError::Provisioning {
            message: "rollback failed".to_string(),
            orphaned_credential: Some("u-123".to_string()),
        });
        let response = api_error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
