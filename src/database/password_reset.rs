use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::password_reset::PasswordResetToken;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

impl PostgresRepository {
    /// Generate a reset token. Returns `(plain_token, token_hash)`; only the
    /// hash is ever persisted.
    pub fn generate_reset_token() -> (String, String) {
        let mut rng = rand::thread_rng();
        let token_bytes: [u8; 32] = rng.r#gen();
        let token = hex::encode(token_bytes);

        (token.clone(), Self::hash_reset_token(&token))
    }

    pub fn hash_reset_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token);
        hex::encode(hasher.finalize())
    }

    pub async fn create_password_reset(&self, user_id: &Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<PasswordResetToken, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn get_password_reset_by_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Remove every token owned by a user. Called before issuing a new token
    /// (at most one live token per account) and after a completed reset
    /// (single use).
    pub async fn delete_reset_tokens_for_user(&self, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Periodic sweep; validation treats swept and never-issued tokens
    /// identically, so this can run concurrently with the reset flow.
    pub async fn sweep_expired_reset_tokens(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_is_64_hex_chars() {
        let (token, token_hash) = PostgresRepository::generate_reset_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(token_hash.len(), 64);
        assert!(token_hash.chars().all(|c| c.is_ascii_hexdigit()));

        assert_ne!(token, token_hash);
        assert_eq!(token_hash, PostgresRepository::hash_reset_token(&token));
    }

    #[test]
    fn tokens_are_unique_across_calls() {
        let (token1, hash1) = PostgresRepository::generate_reset_token();
        let (token2, hash2) = PostgresRepository::generate_reset_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }
}
