use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::domain::models::facility::CancellationPolicy;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookingAction {
    Confirm,
    Reject,
    CancelByUser,
    CancelByFacility,
    CheckIn,
    Complete,
    NoShow,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Reject => "reject",
            BookingAction::CancelByUser => "cancel",
            BookingAction::CancelByFacility => "cancel-by-facility",
            BookingAction::CheckIn => "check-in",
            BookingAction::Complete => "complete",
            BookingAction::NoShow => "no-show",
        }
    }

    fn performed_by_facility(&self) -> bool {
        !matches!(self, BookingAction::CancelByUser)
    }
}

/// How the acting user relates to the booking being transitioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relation {
    pub is_booker: bool,
    /// Owner of the booked facility, or an admin acting on its behalf.
    pub is_facility_side: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("not allowed to {0} this booking")]
    NotPermitted(&'static str),
    #[error("cannot {action} a booking that is {from}")]
    InvalidTransition { from: BookingStatus, action: &'static str },
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotPermitted(_) => AppError::Forbidden(err.to_string()),
            LifecycleError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

/// Target state of `action` from `from`, or `None` when the edge does not exist.
pub fn next_status(from: BookingStatus, action: BookingAction) -> Option<BookingStatus> {
    use BookingStatus::*;
    match (from, action) {
        (Pending, BookingAction::Confirm) => Some(Confirmed),
        (Pending, BookingAction::Reject) => Some(Rejected),
        (Pending | Confirmed, BookingAction::CancelByUser) => Some(CancelledByUser),
        (Pending | Confirmed, BookingAction::CancelByFacility) => Some(CancelledByFacility),
        (Confirmed, BookingAction::CheckIn) => Some(CheckedIn),
        (Confirmed, BookingAction::NoShow) => Some(NoShow),
        (CheckedIn, BookingAction::Complete) => Some(Completed),
        _ => None,
    }
}

pub fn transition(from: BookingStatus, action: BookingAction, relation: Relation) -> Result<BookingStatus, LifecycleError> {
    let permitted = if action.performed_by_facility() {
        relation.is_facility_side
    } else {
        relation.is_booker
    };
    if !permitted {
        return Err(LifecycleError::NotPermitted(action.as_str()));
    }

    next_status(from, action).ok_or(LifecycleError::InvalidTransition {
        from,
        action: action.as_str(),
    })
}

/// Refund owed when cancelling at `now` a booking that starts at `starts_at`.
///
/// Cancelling at least `policy.hours` ahead earns the policy percentage,
/// anything later (including after the start) earns nothing.
pub fn refund_for(policy: &CancellationPolicy, now: DateTime<Utc>, starts_at: DateTime<Utc>) -> u8 {
    if now >= starts_at {
        return 0;
    }
    let notice = starts_at - now;
    if notice >= chrono::Duration::hours(policy.hours as i64) {
        policy.refund_percentage.min(100)
    } else {
        0
    }
}

/// Payment status after moving to `status`.
///
/// Capture happens outside this service: a payment processor marks the row
/// `completed`. Only an already captured payment can become `refunded`.
pub fn payment_status_after(status: BookingStatus, current: PaymentStatus, refund_percentage: u8) -> PaymentStatus {
    match (status, current) {
        (BookingStatus::Rejected | BookingStatus::CancelledByFacility, PaymentStatus::Completed) => PaymentStatus::Refunded,
        (BookingStatus::CancelledByUser, PaymentStatus::Completed) if refund_percentage > 0 => PaymentStatus::Refunded,
        (_, current) => current,
    }
}

pub struct TransitionContext<'a> {
    pub now: DateTime<Utc>,
    pub starts_at: DateTime<Utc>,
    pub policy: &'a CancellationPolicy,
    pub reason: Option<String>,
}

/// Runs `action` against `booking`, updating status, payment and cancellation fields.
pub fn apply(booking: &mut Booking, action: BookingAction, relation: Relation, ctx: TransitionContext<'_>) -> Result<(), LifecycleError> {
    let next = transition(booking.status, action, relation)?;

    let refund = match next {
        BookingStatus::CancelledByUser => Some(refund_for(ctx.policy, ctx.now, ctx.starts_at)),
        BookingStatus::CancelledByFacility | BookingStatus::Rejected => Some(100),
        _ => None,
    };

    if matches!(next, BookingStatus::CancelledByUser | BookingStatus::CancelledByFacility) {
        booking.cancelled_at = Some(ctx.now);
        booking.cancellation_reason = ctx.reason;
    }

    booking.payment_status = payment_status_after(next, booking.payment_status, refund.unwrap_or(0));
    booking.refund_percentage = refund.or(booking.refund_percentage);
    booking.status = next;
    booking.updated_at = ctx.now;
    Ok(())
}
