use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin, booking, facility, health, owner, registration};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public browsing
        .route("/api/v1/facilities", get(facility::list_facilities).post(registration::register_facility))
        .route("/api/v1/facilities/{id}", get(facility::get_facility).put(owner::update_facility))
        .route("/api/v1/facilities/{id}/slots", get(facility::get_slots))
        .route("/api/v1/facilities/{id}/quote", get(facility::get_quote))

        // Partner registration & edits
        .route("/api/v1/registration/validate/{step}", post(registration::validate_registration_step))
        .route("/api/v1/facilities/{id}/sport-types", put(owner::update_sport_types))
        .route("/api/v1/facilities/{id}/active", put(owner::set_facility_active))
        .route("/api/v1/owner/facilities", get(owner::list_owner_facilities))
        .route("/api/v1/owner/bookings", get(owner::list_owner_bookings))

        // Bookings
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_my_bookings))
        .route("/api/v1/bookings/{id}", get(booking::get_booking))
        .route("/api/v1/bookings/{id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{id}/{action}", post(booking::facility_action))

        // Moderation
        .route("/api/v1/admin/facilities", get(admin::list_facilities_for_review))
        .route("/api/v1/admin/facilities/{id}/verification", post(admin::set_verification))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
