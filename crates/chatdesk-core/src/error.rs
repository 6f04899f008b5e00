// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chatdesk backend.

use thiserror::Error;

/// The primary error type used across all Chatdesk crates.
///
/// Variants map one-to-one onto the observable outcomes of the API:
/// authorization failures, missing rows, lifecycle conflicts, storage
/// failures, and provisioning partial failures. The "lost the claim race"
/// outcome is deliberately NOT an error -- see
/// [`crate::types::ClaimOutcome`].
#[derive(Debug, Error)]
pub enum ChatdeskError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request itself is malformed: empty required fields, unknown site
    /// ids, bad range parameters.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The caller presented no credential or an invalid one.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but the operation is not permitted
    /// (wrong role, inactive staff, or a lifecycle guard predicate is false).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The referenced entity does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The operation conflicts with the entity's current lifecycle state,
    /// e.g. writing to a closed conversation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Staff provisioning partially failed. When `orphaned_credential` is
    /// set, the compensating rollback itself failed and a credential with no
    /// matching profile remains resolvable -- an ops concern that must be
    /// surfaced loudly, never swallowed.
    #[error("provisioning failed: {message}")]
    Provisioning {
        message: String,
        orphaned_credential: Option<String>,
    },

    /// Outbound notification delivery failed. Callers on the primary
    /// transaction path log and swallow this variant.
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
