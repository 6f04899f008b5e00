// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authentication middleware.
//!
//! Resolves `Authorization: Bearer <token>` to an [`ActorContext`] and
//! injects it into request extensions. Deactivation revokes a user's stored
//! sessions, so a token for an inactive account normally fails here as
//! unknown; a request racing the revocation still resolves (with
//! `is_active = false`) and the service guards reject it with 403 so the
//! client can distinguish "log in again" from "account disabled".

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chatdesk_core::ChatdeskError;
use chatdesk_service::ChatService;

use crate::error::ApiError;

/// Extract the bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware gating the staff API on a valid session token.
pub async fn session_auth(
    State(service): State<ChatService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        ApiError(ChatdeskError::Unauthorized(
            "missing bearer token".to_string(),
        ))
    })?;

    let actor = service.authenticate(token).await?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
