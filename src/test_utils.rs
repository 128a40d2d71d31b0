use crate::models::offer_letter::OfferLetterFields;
use crate::models::user::{Role, User};
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Fresh unlocked USER-role account with an unexpired credential.
pub fn test_user(username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: "$argon2id$test-hash".to_string(),
        role: Role::User,
        failed_login_attempts: 0,
        locked: false,
        last_password_change: Utc::now(),
        password_expiry: Utc::now() + Duration::days(90),
        password_history: Vec::new(),
        created_at: Utc::now(),
    }
}

pub fn offer_fields() -> OfferLetterFields {
    OfferLetterFields {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
        role: "Business Analyst Intern".to_string(),
        manager: "Alex Rivera".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
    }
}
