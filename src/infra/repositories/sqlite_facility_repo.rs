use crate::domain::{
    models::{
        facility::{Facility, FacilityFilter, Photo, VerificationStatus},
        sport::SportType,
    },
    ports::FacilityRepository,
};
use crate::error::AppError;
use crate::infra::repositories::rows::{facilities_from_rows, FacilityRow, PolicyColumns};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, SqlitePool};

pub struct SqliteFacilityRepo {
    pool: SqlitePool,
}

impl SqliteFacilityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn updated(row: Option<FacilityRow>) -> Result<Facility, AppError> {
    row.ok_or(AppError::NotFound("Facility not found".into()))?.try_into()
}

#[async_trait]
impl FacilityRepository for SqliteFacilityRepo {
    async fn create(&self, facility: &Facility, photos: &[Photo]) -> Result<Facility, AppError> {
        let policy = PolicyColumns::try_from(&facility.cancellation_policy)?;
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let row = sqlx::query_as::<_, FacilityRow>(
            "INSERT INTO facilities (id, owner_id, name_en, name_ar, description_en, description_ar, address_en, address_ar,
                country_code, city, latitude, longitude, currency, timezone, contact, amenities, rules,
                cancellation_hours, refund_percentage, sport_types, verification_status, is_active, is_featured, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&facility.id).bind(&facility.owner_id)
            .bind(&facility.name_en).bind(&facility.name_ar)
            .bind(&facility.description_en).bind(&facility.description_ar)
            .bind(&facility.address_en).bind(&facility.address_ar)
            .bind(&facility.country_code).bind(&facility.city)
            .bind(facility.location.latitude).bind(facility.location.longitude)
            .bind(&facility.currency).bind(&facility.timezone)
            .bind(Json(&facility.contact)).bind(Json(&facility.amenities)).bind(Json(&facility.rules))
            .bind(policy.hours).bind(policy.refund_percentage)
            .bind(Json(&facility.sport_types))
            .bind(facility.verification_status.as_str())
            .bind(facility.is_active).bind(facility.is_featured)
            .bind(facility.created_at).bind(facility.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for photo in photos {
            sqlx::query("INSERT INTO photos (id, facility_id, url, content_type, size_bytes, is_main, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(&photo.id).bind(&photo.facility_id).bind(&photo.url).bind(&photo.content_type)
                .bind(photo.size_bytes).bind(photo.is_main).bind(photo.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Facility>, AppError> {
        sqlx::query_as::<_, FacilityRow>("SELECT * FROM facilities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Facility::try_from)
            .transpose()
    }

    async fn list_bookable(&self, filter: &FacilityFilter) -> Result<Vec<Facility>, AppError> {
        let country = filter.country.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let city = filter.city.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let rows = sqlx::query_as::<_, FacilityRow>(
            "SELECT * FROM facilities
             WHERE verification_status = 'approved' AND is_active = 1
               AND (? IS NULL OR UPPER(country_code) = UPPER(?))
               AND (? IS NULL OR LOWER(city) = LOWER(?))
             ORDER BY is_featured DESC, created_at DESC"
        )
            .bind(country).bind(country)
            .bind(city).bind(city)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;

        facilities_from_rows(rows)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Facility>, AppError> {
        let rows = sqlx::query_as::<_, FacilityRow>("SELECT * FROM facilities WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        facilities_from_rows(rows)
    }

    async fn list_by_status(&self, status: Option<VerificationStatus>) -> Result<Vec<Facility>, AppError> {
        let status = status.map(|s| s.as_str());
        let rows = sqlx::query_as::<_, FacilityRow>(
            "SELECT * FROM facilities WHERE (? IS NULL OR verification_status = ?) ORDER BY created_at ASC"
        )
            .bind(status).bind(status)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        facilities_from_rows(rows)
    }

    async fn update_profile(&self, facility: &Facility) -> Result<Facility, AppError> {
        let policy = PolicyColumns::try_from(&facility.cancellation_policy)?;
        let row = sqlx::query_as::<_, FacilityRow>(
            "UPDATE facilities
             SET name_en = ?, name_ar = ?, description_en = ?, description_ar = ?, address_en = ?, address_ar = ?,
                 country_code = ?, city = ?, latitude = ?, longitude = ?, currency = ?, timezone = ?,
                 contact = ?, amenities = ?, rules = ?, cancellation_hours = ?, refund_percentage = ?, updated_at = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(&facility.name_en).bind(&facility.name_ar)
            .bind(&facility.description_en).bind(&facility.description_ar)
            .bind(&facility.address_en).bind(&facility.address_ar)
            .bind(&facility.country_code).bind(&facility.city)
            .bind(facility.location.latitude).bind(facility.location.longitude)
            .bind(&facility.currency).bind(&facility.timezone)
            .bind(Json(&facility.contact)).bind(Json(&facility.amenities)).bind(Json(&facility.rules))
            .bind(policy.hours).bind(policy.refund_percentage)
            .bind(facility.updated_at)
            .bind(&facility.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        updated(row)
    }

    async fn update_sport_types(&self, id: &str, sport_types: &[SportType], updated_at: DateTime<Utc>) -> Result<Facility, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>("UPDATE facilities SET sport_types = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(Json(sport_types)).bind(updated_at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        updated(row)
    }

    async fn set_active(&self, id: &str, is_active: bool, updated_at: DateTime<Utc>) -> Result<Facility, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>("UPDATE facilities SET is_active = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(is_active).bind(updated_at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        updated(row)
    }

    async fn set_verification_status(&self, id: &str, status: VerificationStatus, updated_at: DateTime<Utc>) -> Result<Facility, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>("UPDATE facilities SET verification_status = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(status.as_str()).bind(updated_at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        updated(row)
    }
}
