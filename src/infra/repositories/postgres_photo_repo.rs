use crate::domain::{models::facility::Photo, ports::PhotoRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresPhotoRepo {
    pool: PgPool,
}

impl PostgresPhotoRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl PhotoRepository for PostgresPhotoRepo {
    async fn list_by_facility(&self, facility_id: &str) -> Result<Vec<Photo>, AppError> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE facility_id = $1 ORDER BY is_main DESC, created_at ASC")
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
