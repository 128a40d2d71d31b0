use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{Role, User};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use std::sync::LazyLock;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password_hash, role, failed_login_attempts, locked, \
     last_password_change, password_expiry, password_history, created_at";

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent users take the same time as
/// requests for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

impl PostgresRepository {
    pub async fn create_user(&self, username: &str, password: &str, role: Role, expiry_days: i64) -> Result<User, AppError> {
        let hash = password_hash(password)?;

        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, password_expiry)
            VALUES ($1, $2, $3, now() + make_interval(days => $4::int))
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(&hash)
        .bind(role)
        .bind(expiry_days)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::UserAlreadyExists(username.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Returns true when a row was deleted. Reset tokens, sessions and offer
    /// letters go with it (ON DELETE CASCADE).
    pub async fn delete_user(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn verify_password(&self, user: &User, password: &str) -> Result<(), AppError> {
        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::InvalidCredentials)?;

        Ok(())
    }

    /// Perform a throwaway Argon2 verification to equalize response timing
    /// regardless of whether the target account exists.
    pub fn dummy_verify(password: &str) {
        let hash = PasswordHash::new(&DUMMY_HASH).expect("invalid dummy hash");
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }

    /// Apply the failed-attempt transition for `username` under a row lock so
    /// concurrent attempts against the same account cannot lose updates.
    ///
    /// Returns `None` when the user does not exist, otherwise whether this
    /// attempt is the one that locked the account.
    pub async fn record_failed_login(&self, username: &str) -> Result<Option<bool>, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 FOR UPDATE"))
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut user) = user else {
            tx.rollback().await?;
            return Ok(None);
        };

        let just_locked = user.record_failure();

        sqlx::query("UPDATE users SET failed_login_attempts = $1, locked = $2 WHERE id = $3")
            .bind(user.failed_login_attempts)
            .bind(user.locked)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(just_locked))
    }

    /// Reset the counter and clear the lock after a successful authentication
    /// (or an administrative unlock).
    pub async fn record_successful_login(&self, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET failed_login_attempts = 0, locked = false WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persist a credential change: new hash, rotated history, fresh
    /// change/expiry stamps. Callers are responsible for having pushed the
    /// outgoing hash onto `user.password_history` first.
    pub async fn update_password(&self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $1,
                password_history = $2,
                last_password_change = $3,
                password_expiry = $4
            WHERE id = $5
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.password_hash)
        .bind(&user.password_history)
        .bind(user.last_password_change)
        .bind(user.password_expiry)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}

pub(crate) fn password_hash(password: &str) -> Result<String, AppError> {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    let hash = PasswordHash::generate(Argon2::default(), password.as_bytes(), salt)?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user;

    #[test]
    fn password_hash_produces_phc_string() {
        let hash = password_hash("Str0ng!Pwd").expect("hashing must succeed");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = password_hash("Str0ng!Pwd").unwrap();
        let b = password_hash("Str0ng!Pwd").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_matches_generated_hash() {
        let mut user = test_user("alice");
        user.password_hash = password_hash("Str0ng!Pwd").unwrap();

        let parsed = PasswordHash::new(&user.password_hash).unwrap();
        assert!(Argon2::default().verify_password(b"Str0ng!Pwd", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn dummy_verify_never_panics() {
        PostgresRepository::dummy_verify("anything at all");
        PostgresRepository::dummy_verify("");
    }
}
