use chrono::{DateTime, NaiveDate, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Stored offer letter. Content is the rendered PDF; rows are immutable once
/// written.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferLetter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub content: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Listing row without the PDF bytes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferLetterMeta {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// Form fields an offer letter is rendered from. The recipient email doubles
/// as the username of the account the letter is filed under.
#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct OfferLetterFields {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    #[validate(length(min = 1, max = 100))]
    pub manager: String,
    pub start_date: NaiveDate,
}

impl OfferLetterFields {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct OfferLetterResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OfferLetterMeta> for OfferLetterResponse {
    fn from(meta: &OfferLetterMeta) -> Self {
        Self {
            id: meta.id,
            user_id: meta.user_id,
            file_name: meta.file_name.clone(),
            created_at: meta.created_at,
        }
    }
}

/// Outcome of the email-delivery flow.
#[derive(Debug, Serialize, JsonSchema)]
pub struct EmailDeliveryResponse {
    pub recipient: String,
    pub file_name: String,
    /// True when a fresh account was provisioned and its credentials were
    /// embedded in the notification body.
    pub new_account: bool,
}
