use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::audit::SecurityAuditLog;
use serde_json::Value as JsonValue;
use uuid::Uuid;

impl PostgresRepository {
    /// Append a security audit record. Callers treat this as best-effort
    /// (`let _ = ...`): an audit failure must never fail the guarded flow.
    pub async fn create_security_audit_log(
        &self,
        user_id: Option<&Uuid>,
        event_type: &str,
        success: bool,
        ip_address: Option<String>,
        user_agent: Option<String>,
        metadata: Option<JsonValue>,
    ) -> Result<SecurityAuditLog, AppError> {
        let log = sqlx::query_as::<_, SecurityAuditLog>(
            r#"
            INSERT INTO security_audit_log (user_id, event_type, success, ip_address, user_agent, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, event_type, success, ip_address, user_agent, metadata, created_at
            "#,
        )
        .bind(user_id)
        .bind(event_type)
        .bind(success)
        .bind(ip_address)
        .bind(user_agent)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }
}
