// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Thin wire adapters: deserialize, call the service, serialize. All policy
//! (roles, lifecycle guards, token checks) lives below this layer.

use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chatdesk_core::{ActorContext, ChatdeskError, ClaimOutcome, Conversation, Role};
use chatdesk_metrics::MetricsRange;
use chatdesk_service::service::{CreateStaffRequest, MetricsReport};
use chatdesk_service::ChatService;
use chatdesk_storage::queries::conversations::InboxTab;
use serde::{Deserialize, Serialize};

use crate::auth::bearer_token;
use crate::error::ApiError;

// ----------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateConversationBody {
    pub site_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerTokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerMessageBody {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub pin: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaffMessageBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CannedQuery {
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffBody {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleBody {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRotaBody {
    #[serde(default)]
    pub rota_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPinBody {
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeOwnPinBody {
    pub current_pin: String,
    pub new_pin: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCannedBody {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCannedBody {
    pub title: String,
    pub body: String,
    pub sort_order: i64,
    pub is_active: bool,
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsBody {
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

fn default_range() -> String {
    "7d".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RotaResolveBody {
    pub names: Vec<String>,
}

/// Claim result on the wire. Losing the race is a 200 with `claimed: false`;
/// the client refreshes its inbox rather than treating it as failure.
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claimed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

const OK: Json<OkResponse> = Json(OkResponse { ok: true });

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ----------------------------------------------------------------------
// Public endpoints
// ----------------------------------------------------------------------

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_conversation(
    State(service): State<ChatService>,
    Json(body): Json<CreateConversationBody>,
) -> Result<Json<chatdesk_service::service::ConversationTicket>, ApiError> {
    let ticket = service
        .create_conversation(
            &body.site_id,
            &body.customer_name,
            body.customer_email.as_deref(),
            &body.message,
        )
        .await?;
    Ok(Json(ticket))
}

pub async fn customer_thread(
    State(service): State<ChatService>,
    Path(id): Path<String>,
    Query(query): Query<CustomerTokenQuery>,
) -> Result<Json<chatdesk_service::service::CustomerThread>, ApiError> {
    Ok(Json(service.customer_thread(&id, &query.token).await?))
}

pub async fn customer_message(
    State(service): State<ChatService>,
    Path(id): Path<String>,
    Json(body): Json<CustomerMessageBody>,
) -> Result<Json<chatdesk_core::Message>, ApiError> {
    let message = service
        .send_customer_message(&id, &body.token, &body.message)
        .await?;
    Ok(Json(message))
}

// ----------------------------------------------------------------------
// Staff auth
// ----------------------------------------------------------------------

pub async fn login(
    State(service): State<ChatService>,
    Json(body): Json<LoginBody>,
) -> Result<Json<chatdesk_service::service::LoginSession>, ApiError> {
    Ok(Json(service.login(&body.username, &body.pin).await?))
}

pub async fn logout(
    State(service): State<ChatService>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, ApiError> {
    // The auth middleware already validated this token.
    if let Some(token) = bearer_token(&headers) {
        service.logout(token).await?;
    }
    Ok(OK)
}

// ----------------------------------------------------------------------
// Staff conversation endpoints
// ----------------------------------------------------------------------

fn parse_tab(query: &InboxQuery, actor: &ActorContext) -> Result<InboxTab, ChatdeskError> {
    match query.tab.as_deref().unwrap_or("unassigned") {
        "unassigned" => Ok(InboxTab::Unassigned),
        "mine" => Ok(InboxTab::Mine(actor.user_id.clone())),
        "all" => Ok(InboxTab::AllOpen),
        "closed" => Ok(InboxTab::Closed),
        other => Err(ChatdeskError::Invalid(format!("invalid inbox tab: {other}"))),
    }
}

pub async fn inbox(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let tab = parse_tab(&query, &actor)?;
    Ok(Json(service.inbox(&actor, tab).await?))
}

pub async fn inbox_counts(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<chatdesk_storage::queries::conversations::InboxCounts>, ApiError> {
    Ok(Json(service.inbox_counts(&actor).await?))
}

pub async fn staff_thread(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Result<Json<chatdesk_service::service::StaffThread>, ApiError> {
    Ok(Json(service.staff_thread(&actor, &id).await?))
}

pub async fn claim(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let response = match service.claim(&actor, &id).await? {
        ClaimOutcome::Claimed(conversation) => ClaimResponse {
            claimed: true,
            conversation: Some(conversation),
        },
        ClaimOutcome::AlreadyClaimed => ClaimResponse {
            claimed: false,
            conversation: None,
        },
    };
    Ok(Json(response))
}

pub async fn staff_message(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<StaffMessageBody>,
) -> Result<Json<chatdesk_core::Message>, ApiError> {
    Ok(Json(
        service.send_staff_message(&actor, &id, &body.message).await?,
    ))
}

pub async fn close(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(service.close(&actor, &id).await?))
}

pub async fn reassign(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<ReassignBody>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(service.reassign(&actor, &id, &body.user_id).await?))
}

pub async fn take_over(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(service.take_over(&actor, &id).await?))
}

pub async fn canned(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<CannedQuery>,
) -> Result<Json<Vec<chatdesk_core::CannedReply>>, ApiError> {
    Ok(Json(
        service.canned_replies(&actor, query.site_id.as_deref()).await?,
    ))
}

pub async fn change_own_pin(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<ChangeOwnPinBody>,
) -> Result<Json<OkResponse>, ApiError> {
    service
        .reset_own_pin(&actor, &body.current_pin, &body.new_pin)
        .await?;
    Ok(OK)
}

pub async fn list_all_canned(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<Vec<chatdesk_core::CannedReply>>, ApiError> {
    Ok(Json(service.list_all_canned(&actor).await?))
}

pub async fn create_canned(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<CreateCannedBody>,
) -> Result<Json<chatdesk_core::CannedReply>, ApiError> {
    let reply = service
        .create_canned(
            &actor,
            &body.title,
            &body.body,
            body.sort_order,
            body.site_id.as_deref(),
        )
        .await?;
    Ok(Json(reply))
}

pub async fn update_canned(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCannedBody>,
) -> Result<Json<OkResponse>, ApiError> {
    let reply = chatdesk_core::CannedReply {
        id,
        title: body.title,
        body: body.body,
        sort_order: body.sort_order,
        is_active: body.is_active,
        site_id: body.site_id,
    };
    service.update_canned(&actor, &reply).await?;
    Ok(OK)
}

pub async fn delete_canned(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    service.delete_canned(&actor, &id).await?;
    Ok(OK)
}

pub async fn list_staff(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<Vec<chatdesk_core::StaffProfile>>, ApiError> {
    Ok(Json(service.list_staff(&actor).await?))
}

// ----------------------------------------------------------------------
// Admin endpoints
// ----------------------------------------------------------------------

fn parse_role(raw: Option<&str>) -> Result<Role, ChatdeskError> {
    let raw = raw.unwrap_or("agent");
    raw.parse::<Role>()
        .map_err(|_| ChatdeskError::Invalid(format!("invalid role: {raw}")))
}

pub async fn create_staff(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<CreateStaffBody>,
) -> Result<Json<chatdesk_core::StaffProfile>, ApiError> {
    let role = parse_role(body.role.as_deref())?;
    let profile = service
        .create_staff(
            &actor,
            CreateStaffRequest {
                username: body.username,
                display_name: body.display_name,
                role,
                site_id: body.site_id,
                pin: body.pin,
            },
        )
        .await?;
    Ok(Json(profile))
}

pub async fn set_staff_active(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<String>,
    Json(body): Json<SetActiveBody>,
) -> Result<Json<OkResponse>, ApiError> {
    service
        .set_staff_active(&actor, &user_id, body.is_active)
        .await?;
    Ok(OK)
}

pub async fn set_staff_role(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<String>,
    Json(body): Json<SetRoleBody>,
) -> Result<Json<OkResponse>, ApiError> {
    let role = parse_role(Some(&body.role))?;
    service.set_staff_role(&actor, &user_id, role).await?;
    Ok(OK)
}

pub async fn set_staff_rota(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<String>,
    Json(body): Json<SetRotaBody>,
) -> Result<Json<OkResponse>, ApiError> {
    service
        .set_staff_rota_name(&actor, &user_id, body.rota_name)
        .await?;
    Ok(OK)
}

pub async fn reset_staff_pin(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<String>,
    Json(body): Json<ResetPinBody>,
) -> Result<Json<OkResponse>, ApiError> {
    service.reset_staff_pin(&actor, &user_id, &body.pin).await?;
    Ok(OK)
}

pub async fn metrics(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<MetricsBody>,
) -> Result<Json<MetricsReport>, ApiError> {
    let range = MetricsRange::parse(&body.range, body.start.as_deref(), body.end.as_deref())?;
    let report = service
        .metrics(&actor, range, body.site_id.as_deref(), body.agent_id.as_deref())
        .await?;
    Ok(Json(report))
}

pub async fn resolve_rota(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<RotaResolveBody>,
) -> Result<Json<Vec<chatdesk_core::rota::RotaMatch>>, ApiError> {
    Ok(Json(service.resolve_rota(&actor, &body.names).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(user_id: &str) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            role: Role::Agent,
            is_active: true,
        }
    }

    #[test]
    fn inbox_tab_parsing() {
        let a = actor("u1");
        assert!(matches!(
            parse_tab(&InboxQuery { tab: None }, &a).unwrap(),
            InboxTab::Unassigned
        ));
        assert!(matches!(
            parse_tab(&InboxQuery { tab: Some("mine".into()) }, &a).unwrap(),
            InboxTab::Mine(id) if id == "u1"
        ));
        assert!(matches!(
            parse_tab(&InboxQuery { tab: Some("all".into()) }, &a).unwrap(),
            InboxTab::AllOpen
        ));
        assert!(parse_tab(&InboxQuery { tab: Some("spam".into()) }, &a).is_err());
    }

    #[test]
    fn role_parsing_defaults_to_agent() {
        assert_eq!(parse_role(None).unwrap(), Role::Agent);
        assert_eq!(parse_role(Some("manager")).unwrap(), Role::Manager);
        assert!(parse_role(Some("superuser")).is_err());
    }

    #[test]
    fn claim_response_omits_conversation_on_loss() {
        let lost = ClaimResponse {
            claimed: false,
            conversation: None,
        };
        let json = serde_json::to_string(&lost).unwrap();
        assert_eq!(json, r#"{"claimed":false}"#);
    }
}
