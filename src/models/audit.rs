use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Event types for the security audit log
pub mod audit_events {
    // Authentication events
    pub const LOGIN_SUCCESS: &str = "login_success";
    pub const LOGIN_FAILED: &str = "login_failed";
    pub const ACCOUNT_LOCKED: &str = "account_locked";
    pub const ACCOUNT_UNLOCKED: &str = "account_unlocked";
    pub const LOGOUT: &str = "logout";

    // Account lifecycle events
    pub const USER_REGISTERED: &str = "user_registered";
    pub const USER_CREATED: &str = "user_created";
    pub const USER_DELETED: &str = "user_deleted";
    pub const ADMIN_BOOTSTRAPPED: &str = "admin_bootstrapped";

    // Password lifecycle events
    pub const PASSWORD_CHANGED: &str = "password_changed";
    pub const PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";
    pub const PASSWORD_RESET_TOKEN_VALIDATED: &str = "password_reset_token_validated";
    pub const PASSWORD_RESET_COMPLETED: &str = "password_reset_completed";
    pub const PASSWORD_RESET_FAILED: &str = "password_reset_failed";

    // Offer letter events
    pub const OFFER_LETTER_GENERATED: &str = "offer_letter_generated";
    pub const OFFER_LETTER_EMAILED: &str = "offer_letter_emailed";
    pub const OFFER_LETTER_VIEWED: &str = "offer_letter_viewed";
    pub const OFFER_LETTER_DOWNLOADED: &str = "offer_letter_downloaded";
    pub const OFFER_LETTER_DELETED: &str = "offer_letter_deleted";
}

/// Append-only audit record. Writers treat failures as best-effort.
#[derive(Debug, sqlx::FromRow)]
pub struct SecurityAuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
