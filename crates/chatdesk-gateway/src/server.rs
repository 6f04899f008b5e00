// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server startup.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use chatdesk_core::ChatdeskError;
use chatdesk_service::ChatService;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::session_auth;
use crate::handlers;
use crate::sse;

/// Build the full application router.
///
/// Public widget endpoints and login are unauthenticated; everything under
/// `/v1` besides login requires a session token.
pub fn build_router(service: ChatService) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/public/conversations", post(handlers::create_conversation))
        .route("/public/conversations/{id}", get(handlers::customer_thread))
        .route(
            "/public/conversations/{id}/messages",
            post(handlers::customer_message),
        )
        .route("/v1/auth/login", post(handlers::login))
        .with_state(service.clone());

    let staff_routes = Router::new()
        .route("/v1/auth/logout", post(handlers::logout))
        .route("/v1/conversations", get(handlers::inbox))
        .route("/v1/conversations/counts", get(handlers::inbox_counts))
        .route("/v1/conversations/{id}", get(handlers::staff_thread))
        .route("/v1/conversations/{id}/claim", post(handlers::claim))
        .route("/v1/conversations/{id}/messages", post(handlers::staff_message))
        .route("/v1/conversations/{id}/close", post(handlers::close))
        .route("/v1/conversations/{id}/reassign", post(handlers::reassign))
        .route("/v1/conversations/{id}/takeover", post(handlers::take_over))
        .route("/v1/canned-replies", get(handlers::canned))
        .route("/v1/staff", get(handlers::list_staff))
        .route("/v1/auth/reset-pin", post(handlers::change_own_pin))
        .route(
            "/v1/admin/canned-replies",
            get(handlers::list_all_canned).post(handlers::create_canned),
        )
        .route(
            "/v1/admin/canned-replies/{id}",
            put(handlers::update_canned).delete(handlers::delete_canned),
        )
        .route("/v1/admin/staff", post(handlers::create_staff))
        .route("/v1/admin/staff/{id}/active", post(handlers::set_staff_active))
        .route("/v1/admin/staff/{id}/role", post(handlers::set_staff_role))
        .route("/v1/admin/staff/{id}/rota", post(handlers::set_staff_rota))
        .route("/v1/admin/staff/{id}/pin", post(handlers::reset_staff_pin))
        .route("/v1/admin/metrics", post(handlers::metrics))
        .route("/v1/admin/rota/resolve", post(handlers::resolve_rota))
        .route("/v1/events", get(sse::events))
        .route_layer(axum_middleware::from_fn_with_state(
            service.clone(),
            session_auth,
        ))
        .with_state(service);

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the listener errors or the task is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    service: ChatService,
) -> Result<(), ChatdeskError> {
    let app = build_router(service);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChatdeskError::Internal(format!("failed to bind {addr}: {e}")))?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ChatdeskError::Internal(format!("server error: {e}")))?;

    Ok(())
}
