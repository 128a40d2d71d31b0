use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Reset token row. Only the SHA-256 of the token is stored; the plain value
/// exists solely in the reset link handed to the user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Step 1: ask for a reset link by username.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,
}

/// Step 2: check a token before showing the reset form.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetValidateRequest {
    #[validate(length(equal = 64))]
    pub token: String,
}

/// Step 3: complete the reset.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(equal = 64))]
    pub token: String,
    pub new_password: String,
}

/// Always the same message, whether or not the account exists.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PasswordResetResponse {
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PasswordResetValidateResponse {
    pub valid: bool,
    /// Only returned for a valid token.
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_row(expires_at: DateTime<Utc>) -> PasswordResetToken {
        PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "0".repeat(64),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn fresh_token_is_not_expired() {
        assert!(!token_row(Utc::now() + Duration::minutes(30)).is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        assert!(token_row(Utc::now() - Duration::seconds(1)).is_expired());
    }
}
