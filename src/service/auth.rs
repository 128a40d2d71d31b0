use crate::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::audit::audit_events;
use crate::models::user::{Role, User};
use crate::service::password_policy;
use chrono::{Duration, Utc};
use tracing::{info, warn};

/// Where an authentication attempt came from; recorded in audit rows.
#[derive(Debug, Default, Clone)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Successful authentication. Expiry is surfaced but never blocks login.
#[derive(Debug)]
pub struct AuthSuccess {
    pub user: User,
    pub password_expired: bool,
}

/// The one authoritative implementation of the account-lockout state machine
/// and the password lifecycle. Routes never apply lockout or history
/// transitions themselves; they go through this service.
pub struct AuthService<'a> {
    pub repo: &'a PostgresRepository,
    pub config: &'a Config,
}

impl<'a> AuthService<'a> {
    pub fn new(repo: &'a PostgresRepository, config: &'a Config) -> Self {
        Self { repo, config }
    }

    /// Check a username/password pair against the stored credential.
    ///
    /// Failure modes, in evaluation order:
    /// - unknown username: `UserNotFound` (login routes mask this as
    ///   `InvalidCredentials` so callers cannot enumerate accounts);
    /// - locked account: `AccountLocked { just_locked: false }`, decided
    ///   before the secret is ever compared;
    /// - wrong password: the failed-attempt transition runs; the attempt that
    ///   crosses the threshold yields `AccountLocked { just_locked: true }`,
    ///   earlier ones `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str, meta: &ClientMeta) -> Result<AuthSuccess, AppError> {
        let Some(user) = self.repo.get_user_by_username(username).await? else {
            // Same response timing as the verification path.
            PostgresRepository::dummy_verify(password);
            return Err(AppError::UserNotFound);
        };

        if user.locked {
            let _ = self
                .repo
                .create_security_audit_log(
                    Some(&user.id),
                    audit_events::LOGIN_FAILED,
                    false,
                    meta.ip.clone(),
                    meta.user_agent.clone(),
                    Some(serde_json::json!({"reason": "account_locked"})),
                )
                .await;
            return Err(AppError::AccountLocked { just_locked: false });
        }

        if self.repo.verify_password(&user, password).await.is_err() {
            let just_locked = self.repo.record_failed_login(username).await?.unwrap_or(false);

            if just_locked {
                warn!(username = %username, "account locked after repeated failed logins");
                let _ = self
                    .repo
                    .create_security_audit_log(Some(&user.id), audit_events::ACCOUNT_LOCKED, false, meta.ip.clone(), meta.user_agent.clone(), None)
                    .await;
                return Err(AppError::AccountLocked { just_locked: true });
            }

            let _ = self
                .repo
                .create_security_audit_log(
                    Some(&user.id),
                    audit_events::LOGIN_FAILED,
                    false,
                    meta.ip.clone(),
                    meta.user_agent.clone(),
                    Some(serde_json::json!({"reason": "bad_credentials"})),
                )
                .await;
            return Err(AppError::InvalidCredentials);
        }

        self.repo.record_successful_login(&user.id).await?;
        let _ = self
            .repo
            .create_security_audit_log(Some(&user.id), audit_events::LOGIN_SUCCESS, true, meta.ip.clone(), meta.user_agent.clone(), None)
            .await;

        let password_expired = user.is_password_expired();
        Ok(AuthSuccess { user, password_expired })
    }

    /// Register a new account. Duplicate usernames conflict; the password
    /// must satisfy the complexity policy.
    pub async fn register_user(&self, username: &str, password: &str, role: Role) -> Result<User, AppError> {
        if self.repo.get_user_by_username(username).await?.is_some() {
            return Err(AppError::UserAlreadyExists(username.to_string()));
        }

        let violations = password_policy::validate_complexity(Some(password));
        if !violations.is_empty() {
            return Err(AppError::PolicyViolation(violations));
        }

        let user = self
            .repo
            .create_user(username, password, role, self.config.security.password_expiry_days)
            .await?;

        info!(username = %username, role = ?role, "registered new account");
        Ok(user)
    }

    /// Issue a reset token. Unknown usernames return `Ok(None)` without an
    /// error; the route always answers with the same masked message. Any
    /// previously issued token for the account is replaced.
    pub async fn create_reset_token(&self, username: &str) -> Result<Option<String>, AppError> {
        let Some(user) = self.repo.get_user_by_username(username).await? else {
            return Ok(None);
        };

        self.repo.delete_reset_tokens_for_user(&user.id).await?;

        let (plain_token, token_hash) = PostgresRepository::generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(self.config.security.reset_token_ttl_minutes);
        self.repo.create_password_reset(&user.id, &token_hash, expires_at).await?;

        Ok(Some(plain_token))
    }

    /// Resolve a token to its owning account. Pure read: expired or unknown
    /// tokens are `None`, and the token is not consumed.
    pub async fn validate_reset_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let token_hash = PostgresRepository::hash_reset_token(token);

        let Some(reset) = self.repo.get_password_reset_by_token(&token_hash).await? else {
            return Ok(None);
        };
        if reset.is_expired() {
            return Ok(None);
        }

        self.repo.get_user_by_id(&reset.user_id).await
    }

    /// Complete a token-based reset. Complexity violations error out with the
    /// full reason list; an invalid token returns `Ok(false)`. On success the
    /// token is deleted (single use) and every session of the account is
    /// invalidated.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<bool, AppError> {
        let violations = password_policy::validate_complexity(Some(new_password));
        if !violations.is_empty() {
            return Err(AppError::PolicyViolation(violations));
        }

        let Some(mut user) = self.validate_reset_token(token).await? else {
            return Ok(false);
        };

        let new_hash = crate::database::user::password_hash(new_password)?;
        let outgoing = std::mem::replace(&mut user.password_hash, new_hash);
        user.push_history(outgoing);
        user.touch_password_change(self.config.security.password_expiry_days);

        self.repo.update_password(&user).await?;
        self.repo.delete_reset_tokens_for_user(&user.id).await?;
        let sessions_dropped = self.repo.invalidate_all_user_sessions(&user.id).await?;

        let _ = self
            .repo
            .create_security_audit_log(
                Some(&user.id),
                audit_events::PASSWORD_RESET_COMPLETED,
                true,
                None,
                None,
                Some(serde_json::json!({"sessions_invalidated": sessions_dropped})),
            )
            .await;

        info!(user_id = %user.id, "password reset completed");
        Ok(true)
    }

    /// Change a password for an already-authenticated account. Same
    /// complexity rules as reset, plus the history reuse check.
    pub async fn update_password(&self, user: &User, new_password: &str) -> Result<User, AppError> {
        let violations = password_policy::validate_complexity(Some(new_password));
        if !violations.is_empty() {
            return Err(AppError::PolicyViolation(violations));
        }

        let new_hash = crate::database::user::password_hash(new_password)?;
        if password_policy::is_in_history(user, &new_hash) {
            return Err(AppError::PolicyViolation(vec![
                "Password has been used recently. Please choose a different password.".to_string(),
            ]));
        }

        let mut user = user.clone();
        let outgoing = std::mem::replace(&mut user.password_hash, new_hash);
        user.push_history(outgoing);
        user.touch_password_change(self.config.security.password_expiry_days);

        let updated = self.repo.update_password(&user).await?;

        let _ = self
            .repo
            .create_security_audit_log(Some(&updated.id), audit_events::PASSWORD_CHANGED, true, None, None, None)
            .await;

        Ok(updated)
    }

    /// Idempotent admin bootstrap: return the existing admin account, or
    /// create it. A configured password that fails the policy is replaced by
    /// a generated one (logged so an operator can pick it up).
    pub async fn ensure_admin_account(&self) -> Result<User, AppError> {
        let admin = &self.config.admin;

        if let Some(existing) = self.repo.get_user_by_username(&admin.username).await? {
            return Ok(existing);
        }

        let mut password = admin.password.clone();
        if !password_policy::validate_complexity(Some(&password)).is_empty() {
            password = password_policy::generate_random_password();
            warn!(username = %admin.username, password = %password, "configured admin password failed the policy; generated a replacement");
        }

        let user = self.repo.create_user(&admin.username, &password, Role::Admin, self.config.security.password_expiry_days).await?;

        let _ = self
            .repo
            .create_security_audit_log(Some(&user.id), audit_events::ADMIN_BOOTSTRAPPED, true, None, None, None)
            .await;

        info!(username = %admin.username, "admin account created");
        Ok(user)
    }

    /// Seed the bootstrap accounts at startup: the admin (when auto-recreate
    /// is on) and a default USER-role account.
    pub async fn seed_default_accounts(&self) -> Result<(), AppError> {
        if self.config.admin.auto_recreate {
            self.ensure_admin_account().await?;
        }

        let admin = &self.config.admin;
        if self.repo.get_user_by_username(&admin.default_user_username).await?.is_none() {
            let mut password = admin.default_user_password.clone();
            if !password_policy::validate_complexity(Some(&password)).is_empty() {
                password = password_policy::generate_random_password();
                warn!(username = %admin.default_user_username, password = %password, "configured default user password failed the policy; generated a replacement");
            }
            self.repo
                .create_user(&admin.default_user_username, &password, Role::User, self.config.security.password_expiry_days)
                .await?;
            info!(username = %admin.default_user_username, "default user account created");
        }

        Ok(())
    }
}
