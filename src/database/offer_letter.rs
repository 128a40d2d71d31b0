use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::offer_letter::{OfferLetter, OfferLetterMeta};
use uuid::Uuid;

impl PostgresRepository {
    pub async fn save_offer_letter(&self, user_id: &Uuid, file_name: &str, content: &[u8]) -> Result<OfferLetterMeta, AppError> {
        let letter = sqlx::query_as::<_, OfferLetterMeta>(
            r#"
            INSERT INTO offer_letters (user_id, file_name, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, file_name, created_at
            "#,
        )
        .bind(user_id)
        .bind(file_name)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(letter)
    }

    pub async fn get_offer_letter_by_id(&self, id: &Uuid) -> Result<Option<OfferLetter>, AppError> {
        let letter = sqlx::query_as::<_, OfferLetter>(
            r#"
            SELECT id, user_id, file_name, content, created_at
            FROM offer_letters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(letter)
    }

    /// Listing intentionally skips the PDF bytes.
    pub async fn get_offer_letters_for_user(&self, user_id: &Uuid) -> Result<Vec<OfferLetterMeta>, AppError> {
        let letters = sqlx::query_as::<_, OfferLetterMeta>(
            r#"
            SELECT id, user_id, file_name, created_at
            FROM offer_letters
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(letters)
    }

    pub async fn get_latest_offer_letter_for_user(&self, user_id: &Uuid) -> Result<Option<OfferLetter>, AppError> {
        let letter = sqlx::query_as::<_, OfferLetter>(
            r#"
            SELECT id, user_id, file_name, content, created_at
            FROM offer_letters
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(letter)
    }

    /// Returns true when a row was deleted.
    pub async fn delete_offer_letter(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM offer_letters WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
