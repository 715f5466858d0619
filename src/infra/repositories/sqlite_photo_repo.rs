use crate::domain::{models::facility::Photo, ports::PhotoRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqlitePhotoRepo {
    pool: SqlitePool,
}

impl SqlitePhotoRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl PhotoRepository for SqlitePhotoRepo {
    async fn list_by_facility(&self, facility_id: &str) -> Result<Vec<Photo>, AppError> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE facility_id = ? ORDER BY is_main DESC, created_at ASC")
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
