// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat service: every operation the HTTP surface exposes.

use std::collections::HashMap;

use chatdesk_config::ChatdeskConfig;
use chatdesk_core::rota::{self, RotaMatch};
use chatdesk_core::{
    ActorContext, CannedReply, ChangeTable, ChatdeskError, ClaimOutcome, Conversation,
    ConversationStatus, Message, Role, StaffProfile, guard,
};
use chatdesk_metrics::{ClosedConversation, CreatedConversation, MetricsRange};
use chatdesk_notify::{Notifier, NotifyEvent};
use chatdesk_storage::queries::conversations::{InboxCounts, InboxTab, NewConversation};
use chatdesk_storage::queries::credentials::Credential;
use chatdesk_storage::queries::{canned, conversations, credentials, messages, metrics, sessions, staff};
use chatdesk_storage::{Database, now_iso};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::events::ChangeFeed;

/// Returned to the customer widget when a conversation is opened. The token
/// is the customer's only credential for the thread.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTicket {
    pub conversation_id: String,
    pub customer_token: String,
}

/// Customer-facing view of a thread. Exposes no staff identifiers beyond
/// what message bodies already carry.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerThread {
    pub conversation_id: String,
    pub status: ConversationStatus,
    pub messages: Vec<Message>,
}

/// Staff-facing view of a thread.
#[derive(Debug, Clone, Serialize)]
pub struct StaffThread {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub profile: StaffProfile,
}

/// New staff request, already role-typed.
#[derive(Debug, Clone)]
pub struct CreateStaffRequest {
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub site_id: Option<String>,
    pub pin: String,
}

/// Resolved reporting window plus aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub window_start: String,
    pub window_end: String,
    pub overall: chatdesk_metrics::OverallSummary,
    pub agents: Vec<chatdesk_metrics::AgentAggregate>,
}

/// Orchestrates storage transactions, the change feed, and webhook
/// notifications. Cheap to clone; all clones share the database writer and
/// the feed.
#[derive(Clone)]
pub struct ChatService {
    db: Database,
    notifier: Notifier,
    feed: ChangeFeed,
    /// site id -> display name, from config.
    sites: HashMap<String, String>,
    staff_domain: String,
    min_pin_length: usize,
}

impl ChatService {
    pub fn new(db: Database, notifier: Notifier, config: &ChatdeskConfig) -> Self {
        let sites = config
            .sites
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        Self {
            db,
            notifier,
            feed: ChangeFeed::new(),
            sites,
            staff_domain: config.auth.staff_domain.clone(),
            min_pin_length: config.auth.min_pin_length,
        }
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn site_name(&self, site_id: &str) -> String {
        self.sites
            .get(site_id)
            .cloned()
            .unwrap_or_else(|| site_id.to_string())
    }

    fn require_active(actor: &ActorContext) -> Result<(), ChatdeskError> {
        if !actor.is_active {
            return Err(ChatdeskError::Forbidden(
                "staff account is deactivated".to_string(),
            ));
        }
        Ok(())
    }

    fn require_admin(actor: &ActorContext) -> Result<(), ChatdeskError> {
        if !guard::can_administer_staff(actor) {
            return Err(ChatdeskError::Forbidden("admins only".to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Public (customer) operations
    // ------------------------------------------------------------------

    /// Open a conversation from the widget. Returns the id and the customer
    /// token the widget stores locally for the rest of the thread.
    pub async fn create_conversation(
        &self,
        site_id: &str,
        customer_name: &str,
        customer_email: Option<&str>,
        first_message: &str,
    ) -> Result<ConversationTicket, ChatdeskError> {
        if !self.sites.contains_key(site_id) {
            return Err(ChatdeskError::Invalid(format!("unknown site: {site_id}")));
        }
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(ChatdeskError::Invalid("customer name required".to_string()));
        }
        let first_message = first_message.trim();
        if first_message.is_empty() {
            return Err(ChatdeskError::Invalid("message required".to_string()));
        }

        let (conversation, message) = conversations::create(
            &self.db,
            NewConversation {
                site_id: site_id.to_string(),
                customer_name: customer_name.to_string(),
                customer_email: customer_email
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string),
                first_message: first_message.to_string(),
            },
        )
        .await?;

        info!(conversation_id = conversation.id, site_id, "conversation opened");
        self.feed.publish(ChangeTable::Conversations, &conversation.id);
        self.notifier
            .publish(&NotifyEvent::NewConversation {
                site_name: self.site_name(site_id),
                customer_name: conversation.customer_name.clone(),
                first_message: message.body,
                conversation_id: conversation.id.clone(),
            })
            .await;

        Ok(ConversationTicket {
            conversation_id: conversation.id,
            customer_token: conversation.customer_token,
        })
    }

    /// The customer's view of their thread, gated on the conversation token.
    pub async fn customer_thread(
        &self,
        conversation_id: &str,
        customer_token: &str,
    ) -> Result<CustomerThread, ChatdeskError> {
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| ChatdeskError::NotFound {
                what: "conversation".to_string(),
            })?;
        if conversation.customer_token != customer_token {
            return Err(ChatdeskError::Unauthorized(
                "invalid conversation token".to_string(),
            ));
        }
        let messages = messages::list_for_conversation(&self.db, conversation_id).await?;
        Ok(CustomerThread {
            conversation_id: conversation.id,
            status: conversation.status,
            messages,
        })
    }

    /// Append a customer follow-up.
    pub async fn send_customer_message(
        &self,
        conversation_id: &str,
        customer_token: &str,
        body: &str,
    ) -> Result<Message, ChatdeskError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ChatdeskError::Invalid("message required".to_string()));
        }

        let message =
            messages::insert_customer_message(&self.db, conversation_id, customer_token, body)
                .await?;

        self.feed.publish(ChangeTable::Messages, conversation_id);
        if let Some(conversation) = conversations::get(&self.db, conversation_id).await? {
            self.notifier
                .publish(&NotifyEvent::NewCustomerMessage {
                    site_name: self.site_name(&conversation.site_id),
                    customer_name: conversation.customer_name,
                    message: message.body.clone(),
                    conversation_id: conversation_id.to_string(),
                })
                .await;
        }
        Ok(message)
    }

    // ------------------------------------------------------------------
    // Staff authentication
    // ------------------------------------------------------------------

    /// Verify username + PIN and mint a session token.
    pub async fn login(&self, username: &str, pin: &str) -> Result<LoginSession, ChatdeskError> {
        let username = auth::normalize_username(username);
        if username.is_empty() {
            return Err(ChatdeskError::Invalid("username required".to_string()));
        }
        let email = auth::login_email(&username, &self.staff_domain);

        let Some(credential) = credentials::get_by_login_email(&self.db, &email).await? else {
            return Err(ChatdeskError::Unauthorized("invalid credentials".to_string()));
        };
        if !auth::verify_pin(pin, &credential.pin_hash) {
            return Err(ChatdeskError::Unauthorized("invalid credentials".to_string()));
        }

        let Some(profile) = staff::get_profile(&self.db, &credential.user_id).await? else {
            // Credential with no profile: a provisioning orphan.
            error!(user_id = credential.user_id, "credential resolves to no staff profile");
            return Err(ChatdeskError::Unauthorized("invalid credentials".to_string()));
        };
        if !profile.is_active {
            return Err(ChatdeskError::Forbidden(
                "staff account is deactivated".to_string(),
            ));
        }

        let token = sessions::create(&self.db, &profile.user_id).await?;
        info!(user_id = profile.user_id, "staff login");
        Ok(LoginSession { token, profile })
    }

    pub async fn logout(&self, token: &str) -> Result<(), ChatdeskError> {
        sessions::delete(&self.db, token).await
    }

    /// Resolve a bearer token to the acting identity.
    pub async fn authenticate(&self, token: &str) -> Result<ActorContext, ChatdeskError> {
        sessions::actor_for_token(&self.db, token)
            .await?
            .ok_or_else(|| ChatdeskError::Unauthorized("invalid session token".to_string()))
    }

    // ------------------------------------------------------------------
    // Staff conversation operations
    // ------------------------------------------------------------------

    pub async fn inbox(
        &self,
        actor: &ActorContext,
        tab: InboxTab,
    ) -> Result<Vec<Conversation>, ChatdeskError> {
        Self::require_active(actor)?;
        conversations::list_inbox(&self.db, tab).await
    }

    pub async fn inbox_counts(&self, actor: &ActorContext) -> Result<InboxCounts, ChatdeskError> {
        Self::require_active(actor)?;
        conversations::counts(&self.db, &actor.user_id).await
    }

    pub async fn staff_thread(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
    ) -> Result<StaffThread, ChatdeskError> {
        Self::require_active(actor)?;
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| ChatdeskError::NotFound {
                what: "conversation".to_string(),
            })?;
        let messages = messages::list_for_conversation(&self.db, conversation_id).await?;
        Ok(StaffThread {
            conversation,
            messages,
        })
    }

    /// Attempt to claim. Losing the race returns
    /// [`ClaimOutcome::AlreadyClaimed`]; the caller refreshes their inbox.
    pub async fn claim(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
    ) -> Result<ClaimOutcome, ChatdeskError> {
        Self::require_active(actor)?;
        let outcome = conversations::claim(&self.db, conversation_id, &actor.user_id).await?;

        if let ClaimOutcome::Claimed(conversation) = &outcome {
            info!(conversation_id, user_id = actor.user_id, "conversation claimed");
            self.feed.publish(ChangeTable::Conversations, conversation_id);
            self.notifier
                .publish(&NotifyEvent::Claimed {
                    site_name: self.site_name(&conversation.site_id),
                    claimed_by: actor.display_name.clone(),
                    customer_name: conversation.customer_name.clone(),
                    conversation_id: conversation_id.to_string(),
                })
                .await;
        } else {
            warn!(conversation_id, user_id = actor.user_id, "claim lost to another staff member");
        }
        Ok(outcome)
    }

    /// Append a staff reply. Does not claim.
    pub async fn send_staff_message(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
        body: &str,
    ) -> Result<Message, ChatdeskError> {
        Self::require_active(actor)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(ChatdeskError::Invalid("message required".to_string()));
        }
        let message =
            messages::insert_staff_message(&self.db, conversation_id, actor, body).await?;
        self.feed.publish(ChangeTable::Messages, conversation_id);
        Ok(message)
    }

    /// Close a conversation the actor may close.
    pub async fn close(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
    ) -> Result<Conversation, ChatdeskError> {
        Self::require_active(actor)?;
        let conversation = conversations::close(&self.db, conversation_id, actor).await?;

        info!(conversation_id, user_id = actor.user_id, "conversation closed");
        self.feed.publish(ChangeTable::Conversations, conversation_id);
        self.notifier
            .publish(&NotifyEvent::Closed {
                site_name: self.site_name(&conversation.site_id),
                closed_by: actor.display_name.clone(),
                customer_name: conversation.customer_name.clone(),
                conversation_id: conversation_id.to_string(),
            })
            .await;
        Ok(conversation)
    }

    /// Hand a conversation to another active staff member. Admin or manager
    /// only; overwrites any current assignee.
    pub async fn reassign(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
        target_user_id: &str,
    ) -> Result<Conversation, ChatdeskError> {
        if !guard::can_reassign(actor) {
            return Err(ChatdeskError::Forbidden(
                "reassignment requires admin or manager role".to_string(),
            ));
        }
        if target_user_id == actor.user_id {
            // Pulling a chat to yourself leaves a visible audit notice.
            return self.take_over(actor, conversation_id).await;
        }
        let target = staff::get_profile(&self.db, target_user_id)
            .await?
            .ok_or_else(|| ChatdeskError::NotFound {
                what: "staff profile".to_string(),
            })?;
        if !target.is_active {
            return Err(ChatdeskError::Invalid(
                "cannot assign to deactivated staff".to_string(),
            ));
        }

        let conversation = conversations::reassign(&self.db, conversation_id, target_user_id).await?;
        info!(conversation_id, target_user_id, by = actor.user_id, "conversation reassigned");
        self.feed.publish(ChangeTable::Conversations, conversation_id);
        Ok(conversation)
    }

    /// Take over a conversation: reassign to the actor and append an audit
    /// notice visible in the thread.
    pub async fn take_over(
        &self,
        actor: &ActorContext,
        conversation_id: &str,
    ) -> Result<Conversation, ChatdeskError> {
        if !guard::can_reassign(actor) {
            return Err(ChatdeskError::Forbidden(
                "take-over requires admin or manager role".to_string(),
            ));
        }
        let (conversation, _notice) =
            conversations::take_over(&self.db, conversation_id, actor).await?;
        info!(conversation_id, user_id = actor.user_id, "conversation taken over");
        self.feed.publish(ChangeTable::Conversations, conversation_id);
        self.feed.publish(ChangeTable::Messages, conversation_id);
        Ok(conversation)
    }

    pub async fn canned_replies(
        &self,
        actor: &ActorContext,
        site_id: Option<&str>,
    ) -> Result<Vec<CannedReply>, ChatdeskError> {
        Self::require_active(actor)?;
        canned::list_active(&self.db, site_id).await
    }

    pub async fn list_all_canned(
        &self,
        actor: &ActorContext,
    ) -> Result<Vec<CannedReply>, ChatdeskError> {
        Self::require_admin(actor)?;
        canned::list_all(&self.db).await
    }

    pub async fn create_canned(
        &self,
        actor: &ActorContext,
        title: &str,
        body: &str,
        sort_order: i64,
        site_id: Option<&str>,
    ) -> Result<CannedReply, ChatdeskError> {
        Self::require_admin(actor)?;
        let title = title.trim();
        if title.is_empty() || body.trim().is_empty() {
            return Err(ChatdeskError::Invalid(
                "canned reply needs a title and a body".to_string(),
            ));
        }
        if let Some(site) = site_id {
            if !self.sites.contains_key(site) {
                return Err(ChatdeskError::Invalid(format!("unknown site: {site}")));
            }
        }
        canned::create(&self.db, title, body, sort_order, site_id).await
    }

    pub async fn update_canned(
        &self,
        actor: &ActorContext,
        reply: &CannedReply,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        if reply.title.trim().is_empty() || reply.body.trim().is_empty() {
            return Err(ChatdeskError::Invalid(
                "canned reply needs a title and a body".to_string(),
            ));
        }
        canned::update(&self.db, reply).await
    }

    pub async fn delete_canned(
        &self,
        actor: &ActorContext,
        id: &str,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        canned::delete(&self.db, id).await
    }

    // ------------------------------------------------------------------
    // Staff administration
    // ------------------------------------------------------------------

    /// Provision a staff member: credential first, profile second. If the
    /// profile insert fails the credential is deleted again; if that
    /// compensating delete also fails, the error names the orphaned
    /// credential so operators can clean up by hand.
    pub async fn create_staff(
        &self,
        actor: &ActorContext,
        req: CreateStaffRequest,
    ) -> Result<StaffProfile, ChatdeskError> {
        Self::require_admin(actor)?;

        let username = auth::normalize_username(&req.username);
        if username.is_empty() {
            return Err(ChatdeskError::Invalid("username required".to_string()));
        }
        if req.pin.len() < self.min_pin_length {
            return Err(ChatdeskError::Invalid(format!(
                "pin must be at least {} characters",
                self.min_pin_length
            )));
        }
        let display_name = req
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&username)
            .to_string();

        let user_id = Uuid::new_v4().to_string();
        let now = now_iso();
        let pin_hash = auth::hash_pin(&req.pin)?;

        credentials::insert(
            &self.db,
            &Credential {
                user_id: user_id.clone(),
                login_email: auth::login_email(&username, &self.staff_domain),
                pin_hash,
                created_at: now.clone(),
                updated_at: now.clone(),
            },
        )
        .await?;

        let profile = StaffProfile {
            user_id: user_id.clone(),
            username,
            display_name,
            role: req.role,
            site_id: req.site_id,
            is_active: true,
            rota_name: None,
            created_at: now,
        };

        if let Err(profile_err) = staff::insert_profile(&self.db, &profile).await {
            match credentials::delete(&self.db, &user_id).await {
                Ok(_) => return Err(profile_err),
                Err(rollback_err) => {
                    error!(
                        user_id,
                        error = %rollback_err,
                        "credential rollback failed after profile insert error"
                    );
                    return Err(ChatdeskError::Provisioning {
                        message: format!(
                            "profile insert failed ({profile_err}) and credential rollback failed ({rollback_err})"
                        ),
                        orphaned_credential: Some(user_id),
                    });
                }
            }
        }

        info!(user_id = profile.user_id, username = profile.username, "staff provisioned");
        Ok(profile)
    }

    pub async fn list_staff(&self, actor: &ActorContext) -> Result<Vec<StaffProfile>, ChatdeskError> {
        Self::require_active(actor)?;
        // Agents see only active colleagues (the reassign picker); admins see
        // everyone.
        staff::list(&self.db, guard::can_administer_staff(actor)).await
    }

    /// Activate or deactivate a staff member. Deactivation revokes every
    /// live session so the account is locked out immediately.
    pub async fn set_staff_active(
        &self,
        actor: &ActorContext,
        user_id: &str,
        is_active: bool,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        staff::set_active(&self.db, user_id, is_active).await?;
        if !is_active {
            let revoked = sessions::delete_for_user(&self.db, user_id).await?;
            info!(user_id, revoked, "staff deactivated");
        }
        Ok(())
    }

    pub async fn set_staff_role(
        &self,
        actor: &ActorContext,
        user_id: &str,
        role: Role,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        staff::set_role(&self.db, user_id, role).await
    }

    pub async fn set_staff_rota_name(
        &self,
        actor: &ActorContext,
        user_id: &str,
        rota_name: Option<String>,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        staff::set_rota_name(&self.db, user_id, rota_name).await
    }

    pub async fn reset_staff_pin(
        &self,
        actor: &ActorContext,
        user_id: &str,
        pin: &str,
    ) -> Result<(), ChatdeskError> {
        Self::require_admin(actor)?;
        if pin.len() < self.min_pin_length {
            return Err(ChatdeskError::Invalid(format!(
                "pin must be at least {} characters",
                self.min_pin_length
            )));
        }
        let pin_hash = auth::hash_pin(pin)?;
        credentials::update_pin_hash(&self.db, user_id, &pin_hash).await
    }

    /// Self-service PIN change. Requires the current PIN as re-auth; a stolen
    /// session token alone cannot rotate the credential.
    pub async fn reset_own_pin(
        &self,
        actor: &ActorContext,
        current_pin: &str,
        new_pin: &str,
    ) -> Result<(), ChatdeskError> {
        Self::require_active(actor)?;
        if new_pin.len() < self.min_pin_length {
            return Err(ChatdeskError::Invalid(format!(
                "pin must be at least {} characters",
                self.min_pin_length
            )));
        }

        let profile = staff::get_profile(&self.db, &actor.user_id)
            .await?
            .ok_or_else(|| ChatdeskError::NotFound {
                what: "staff profile".to_string(),
            })?;
        let email = auth::login_email(&profile.username, &self.staff_domain);
        let Some(credential) = credentials::get_by_login_email(&self.db, &email).await? else {
            error!(user_id = actor.user_id, "profile exists without credential");
            return Err(ChatdeskError::NotFound {
                what: "credential".to_string(),
            });
        };
        if !auth::verify_pin(current_pin, &credential.pin_hash) {
            return Err(ChatdeskError::Forbidden(
                "current pin is incorrect".to_string(),
            ));
        }

        let pin_hash = auth::hash_pin(new_pin)?;
        credentials::update_pin_hash(&self.db, &actor.user_id, &pin_hash).await?;
        info!(user_id = actor.user_id, "pin changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Per-agent scorecards over a reporting window. Admin only.
    pub async fn metrics(
        &self,
        actor: &ActorContext,
        range: MetricsRange,
        site_id: Option<&str>,
        agent_id: Option<&str>,
    ) -> Result<MetricsReport, ChatdeskError> {
        Self::require_admin(actor)?;
        let (start, end) = range.resolve(chrono::Utc::now());

        let created = metrics::created_in_window(&self.db, &start, &end, site_id, agent_id).await?;
        let closed = metrics::closed_in_window(&self.db, &start, &end, site_id, agent_id).await?;
        let profiles: HashMap<String, StaffProfile> = staff::list(&self.db, true)
            .await?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        let created: Vec<CreatedConversation> = created
            .into_iter()
            .map(|r| CreatedConversation {
                agent_id: r.agent_id,
                created_at: r.created_at,
                first_staff_reply_at: r.first_staff_reply_at,
            })
            .collect();
        let closed: Vec<ClosedConversation> = closed
            .into_iter()
            .map(|r| ClosedConversation {
                agent_id: r.agent_id,
                created_at: r.created_at,
                closed_at: r.closed_at,
            })
            .collect();

        let (overall, agents) = chatdesk_metrics::aggregate(&created, &closed, &profiles);
        Ok(MetricsReport {
            window_start: start,
            window_end: end,
            overall,
            agents,
        })
    }

    /// Match external rota feed names against the staff directory.
    pub async fn resolve_rota(
        &self,
        actor: &ActorContext,
        feed_names: &[String],
    ) -> Result<Vec<RotaMatch>, ChatdeskError> {
        Self::require_admin(actor)?;
        let directory = staff::list(&self.db, true).await?;
        Ok(rota::match_staff(feed_names, &directory))
    }
}
