use crate::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::db::init_pool;

#[derive(Debug, Clone, Copy)]
pub struct SweepResult {
    pub tokens_removed: u64,
    pub sessions_removed: u64,
}

/// Remove expired reset tokens and sessions. Safe to run while the service
/// is live: token validation treats swept and never-issued tokens the same.
pub async fn sweep_expired(config: &Config) -> Result<SweepResult, String> {
    let pool = init_pool(&config.database)
        .await
        .map_err(|err| format!("Failed to initialize database pool: {err}"))?;

    let repo = PostgresRepository { pool: pool.clone() };

    let tokens_removed = repo
        .sweep_expired_reset_tokens()
        .await
        .map_err(|err| format!("Failed to sweep expired reset tokens: {err:?}"))?;

    let sessions_removed = repo
        .sweep_expired_sessions()
        .await
        .map_err(|err| format!("Failed to sweep expired sessions: {err:?}"))?;

    pool.close().await;

    Ok(SweepResult {
        tokens_removed,
        sessions_removed,
    })
}
