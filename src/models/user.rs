use chrono::{DateTime, Duration, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Failed attempts before an account is locked.
pub const LOCKOUT_THRESHOLD: i32 = 5;

/// Number of previous password hashes retained for reuse checks.
pub const PASSWORD_HISTORY_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, JsonSchema)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// Account row. The lockout counter and flag are only ever mutated through
/// [`User::record_failure`] and [`User::record_success`] so the invariant
/// (locked iff the counter reached the threshold since the last reset) holds
/// everywhere.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub failed_login_attempts: i32,
    pub locked: bool,
    pub last_password_change: DateTime<Utc>,
    pub password_expiry: DateTime<Utc>,
    /// Previous password hashes, oldest first, capped at
    /// [`PASSWORD_HISTORY_DEPTH`].
    pub password_history: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Password expiry is advisory: it never blocks login, callers surface it
    /// so the UI can prompt for a change.
    pub fn is_password_expired(&self) -> bool {
        Utc::now() > self.password_expiry
    }

    /// Apply the failed-attempt transition. Returns true when this attempt is
    /// the one that locked the account.
    pub fn record_failure(&mut self) -> bool {
        self.failed_login_attempts += 1;
        if !self.locked && self.failed_login_attempts >= LOCKOUT_THRESHOLD {
            self.locked = true;
            return true;
        }
        false
    }

    /// Apply the success transition: counter back to zero, lock cleared.
    pub fn record_success(&mut self) {
        self.failed_login_attempts = 0;
        self.locked = false;
    }

    /// Push a hash onto the history, evicting the oldest entry past the cap.
    pub fn push_history(&mut self, hash: String) {
        self.password_history.push(hash);
        if self.password_history.len() > PASSWORD_HISTORY_DEPTH {
            self.password_history.remove(0);
        }
    }

    /// Stamp a fresh credential change: now + the configured expiry window.
    pub fn touch_password_change(&mut self, expiry_days: i64) {
        self.last_password_change = Utc::now();
        self.password_expiry = Utc::now() + Duration::days(expiry_days);
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            locked: user.locked,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 254))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Advisory flag: the stored credential is past its expiry date. Login
    /// still succeeds; the client should prompt for a password change.
    pub password_expired: bool,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Admin-side account creation; unlike self-registration the role is chosen.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 254))]
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user;

    #[test]
    fn five_failures_lock_the_account() {
        let mut user = test_user("alice");
        for attempt in 1..=4 {
            let just_locked = user.record_failure();
            assert!(!just_locked, "attempt {} must not lock", attempt);
            assert!(!user.locked);
        }
        assert!(user.record_failure(), "fifth failure reports the fresh lock");
        assert!(user.locked);
        assert_eq!(user.failed_login_attempts, 5);
    }

    #[test]
    fn success_resets_counter_and_lock() {
        let mut user = test_user("alice");
        user.failed_login_attempts = 3;
        user.record_success();
        assert_eq!(user.failed_login_attempts, 0);
        assert!(!user.locked);
    }

    #[test]
    fn further_failures_do_not_re_report_lock() {
        let mut user = test_user("alice");
        for _ in 0..5 {
            user.record_failure();
        }
        assert!(!user.record_failure(), "sixth failure is not a fresh lock");
        assert!(user.locked);
    }

    #[test]
    fn history_keeps_only_the_most_recent_five() {
        let mut user = test_user("alice");
        for i in 1..=6 {
            user.push_history(format!("hash-{}", i));
        }
        assert_eq!(user.password_history.len(), PASSWORD_HISTORY_DEPTH);
        // hash-1 was evicted, hash-2..=hash-6 remain in order
        assert!(!user.password_history.contains(&"hash-1".to_string()));
        assert_eq!(user.password_history.first().unwrap(), "hash-2");
        assert_eq!(user.password_history.last().unwrap(), "hash-6");
    }

    #[test]
    fn expiry_is_detected() {
        let mut user = test_user("alice");
        assert!(!user.is_password_expired());
        user.password_expiry = Utc::now() - Duration::days(1);
        assert!(user.is_password_expired());
    }

    #[test]
    fn touch_password_change_extends_expiry() {
        let mut user = test_user("alice");
        user.password_expiry = Utc::now() - Duration::days(1);
        user.touch_password_change(90);
        assert!(!user.is_password_expired());
        assert!(user.password_expiry > Utc::now() + Duration::days(89));
    }
}
