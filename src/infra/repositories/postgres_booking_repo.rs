use crate::domain::{models::booking::{Booking, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::{bookings_from_rows, BookingColumns, BookingRow, ACTIVE_STATUSES};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::warn;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let cols = BookingColumns::from(booking);
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serialises concurrent inserts for the same court and day.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}|{}|{}", booking.facility_id, booking.sport_type, booking.booking_date))
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (id, user_id, facility_id, sport_type, booking_date, start_time, end_time, duration_minutes,
                number_of_players, base_price, total_price, currency, status, payment_status, refund_percentage,
                cancellation_reason, cancelled_at, created_at, updated_at)
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19
             WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE facility_id = $3 AND sport_type = $4 AND booking_date = $5
                  AND status IN {} AND start_time < $7 AND end_time > $6
             )
             RETURNING *",
            ACTIVE_STATUSES
        ))
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.facility_id).bind(&booking.sport_type)
            .bind(booking.booking_date).bind(&cols.start_time).bind(&cols.end_time).bind(booking.duration_minutes)
            .bind(booking.number_of_players).bind(&cols.base_price).bind(&cols.total_price).bind(&booking.currency)
            .bind(booking.status.as_str()).bind(booking.payment_status.as_str()).bind(cols.refund_percentage)
            .bind(&booking.cancellation_reason).bind(booking.cancelled_at).bind(booking.created_at).bind(booking.updated_at)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let Some(row) = row else {
            warn!("Booking {} lost the race for {} {} {}", booking.id, booking.facility_id, booking.booking_date, cols.start_time);
            return Err(AppError::Conflict("Time slot is already booked".into()));
        };

        tx.commit().await.map_err(AppError::Database)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC, start_time DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        bookings_from_rows(rows)
    }

    async fn list_for_owner(&self, owner_id: &str, status: Option<BookingStatus>, facility_id: Option<&str>) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT b.* FROM bookings b
             JOIN facilities f ON f.id = b.facility_id
             WHERE f.owner_id = $1
               AND ($2::text IS NULL OR b.status = $2)
               AND ($3::text IS NULL OR b.facility_id = $3)
             ORDER BY b.booking_date ASC, b.start_time ASC"
        )
            .bind(owner_id)
            .bind(status.map(|s| s.as_str()))
            .bind(facility_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        bookings_from_rows(rows)
    }

    async fn list_active_for_day(&self, facility_id: &str, sport_type: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT * FROM bookings
             WHERE facility_id = $1 AND sport_type = $2 AND booking_date = $3 AND status IN {}
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
             SET status = $1, payment_status = $2, refund_percentage = $3, cancellation_reason = $4, cancelled_at = $5, updated_at = $6
             WHERE id = $7 AND status = $8
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
