use crate::domain::{models::booking::{Booking, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{bookings_from_rows, BookingColumns, BookingRow, ACTIVE_STATUSES};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::warn;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let cols = BookingColumns::from(booking);
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(&format!(
            "INSERT INTO bookings (id, user_id, facility_id, sport_type, booking_date, start_time, end_time, duration_minutes,
                number_of_players, base_price, total_price, currency, status, payment_status, refund_percentage,
                cancellation_reason, cancelled_at, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE facility_id = ? AND sport_type = ? AND booking_date = ?
                  AND status IN {} AND start_time < ? AND end_time > ?
             )",
            ACTIVE_STATUSES
        ))
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.facility_id).bind(&booking.sport_type)
            .bind(booking.booking_date).bind(&cols.start_time).bind(&cols.end_time).bind(booking.duration_minutes)
            .bind(booking.number_of_players).bind(&cols.base_price).bind(&cols.total_price).bind(&booking.currency)
            .bind(booking.status.as_str()).bind(booking.payment_status.as_str()).bind(cols.refund_percentage)
            .bind(&booking.cancellation_reason).bind(booking.cancelled_at).bind(booking.created_at).bind(booking.updated_at)
            .bind(&booking.facility_id).bind(&booking.sport_type).bind(booking.booking_date)
            .bind(&cols.end_time).bind(&cols.start_time)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            warn!("Booking {} lost the race for {} {} {}", booking.id, booking.facility_id, booking.booking_date, cols.start_time);
            return Err(AppError::Conflict("Time slot is already booked".into()));
        }

        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?")
            .bind(&booking.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE user_id = ? ORDER BY booking_date DESC, start_time DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        bookings_from_rows(rows)
    }

    async fn list_for_owner(&self, owner_id: &str, status: Option<BookingStatus>, facility_id: Option<&str>) -> Result<Vec<Booking>, AppError> {
        let status = status.map(|s| s.as_str());
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT b.* FROM bookings b
             JOIN facilities f ON f.id = b.facility_id
             WHERE f.owner_id = ?
               AND (? IS NULL OR b.status = ?)
               AND (? IS NULL OR b.facility_id = ?)
             ORDER BY b.booking_date ASC, b.start_time ASC"
        )
            .bind(owner_id)
            .bind(status).bind(status)
            .bind(facility_id).bind(facility_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        bookings_from_rows(rows)
    }

    async fn list_active_for_day(&self, facility_id: &str, sport_type: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT * FROM bookings
             WHERE facility_id = ? AND sport_type = ? AND booking_date = ? AND status IN {}
             ORDER BY start_time ASC",
            ACTIVE_STATUSES
        ))
            .bind(facility_id).bind(sport_type).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        bookings_from_rows(rows)
    }

    async fn update_status(&self, booking: &Booking, from: BookingStatus) -> Result<Booking, AppError> {
        let cols = BookingColumns::from(booking);
        let row = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings
             SET status = ?, payment_status = ?, refund_percentage = ?, cancellation_reason = ?, cancelled_at = ?, updated_at = ?
             WHERE id = ? AND status = ?
             RETURNING *"
        )
            .bind(booking.status.as_str()).bind(booking.payment_status.as_str()).bind(cols.refund_percentage)
            .bind(&booking.cancellation_reason).bind(booking.cancelled_at).bind(booking.updated_at)
            .bind(&booking.id).bind(from.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        match row {
            Some(row) => row.try_into(),
            None => {
                warn!("Booking {} is no longer {}, dropping transition to {}", booking.id, from, booking.status);
                Err(AppError::Conflict("Booking was changed by another request".into()))
            }
        }
    }
}
