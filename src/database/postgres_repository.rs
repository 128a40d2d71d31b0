use sqlx::PgPool;

/// Handle every repository method hangs off. Cheap to clone; routes build one
/// from the managed pool per request.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
