mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use common::{registration_payload, TestApp};
use facility_booking::domain::models::booking::BookingStatus;
use facility_booking::error::AppError;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_booking_is_priced_and_pending() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    let (status, body) = app.book("user-1", &id, "2030-01-14", "18:00", 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["payment_status"], "pending");
    assert_eq!(body["start_time"], "18:00");
    assert_eq!(body["end_time"], "20:00");
    assert_eq!(body["duration_minutes"], 120);
    assert_eq!(body["base_price"], "80");
    assert_eq!(body["total_price"], "160");
    assert_eq!(body["currency"], "SAR");
    assert_eq!(body["user_id"], "user-1");
}

#[tokio::test]
async fn test_booking_requires_identity() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    let (status, _) = app.call("POST", "/api/v1/bookings", None, Some(json!({
        "facility_id": id, "sport_type": "Football", "date": "2030-01-14", "start_time": "18:00"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_session_needs_csrf_header() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let token = app.token("user-1", "user");
    let payload = json!({
        "facility_id": id, "sport_type": "Football", "date": "2030-01-14", "start_time": "08:00"
    });

    let without = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/bookings")
            .header(header::COOKIE, format!("access_token={}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(without.status(), StatusCode::FORBIDDEN);

    let with = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/bookings")
            .header(header::COOKIE, format!("access_token={}", token))
            .header("X-CSRF-Token", "csrf-user-1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(with.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_double_booking_is_prevented() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    let (status, _) = app.book("user-1", &id, "2030-01-14", "18:00", 2).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.book("user-2", &id, "2030-01-14", "18:00", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book("user-2", &id, "2030-01-14", "19:00", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book("user-2", &id, "2030-01-14", "20:00", 1).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same time on another date is fine
    let (status, _) = app.book("user-2", &id, "2030-01-21", "18:00", 1).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_court() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    let (_, booking) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let user = app.token("user-1", "user");
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()), Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.book("user-2", &id, "2030-01-14", "18:00", 1).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_request_rules() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    // 10:00 today has already started
    let (status, _) = app.book("user-1", &id, "2030-01-07", "10:00", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Not an hourly slot boundary
    let (status, _) = app.book("user-1", &id, "2030-01-14", "18:30", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.book("user-1", &id, "2030-01-14", "18:00", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 21:00 + 3h runs past midnight
    let (status, _) = app.book("user-1", &id, "2030-01-14", "21:00", 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.book("user-1", &id, "2029-12-31", "08:00", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = app.token("user-1", "user");
    let (status, _) = app.call("POST", "/api/v1/bookings", Some(&token), Some(json!({
        "facility_id": id, "sport_type": "Football", "date": "2030-01-14",
        "start_time": "08:00", "number_of_players": 11
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("POST", "/api/v1/bookings", Some(&token), Some(json!({
        "facility_id": id, "sport_type": "Basketball", "date": "2030-01-14", "start_time": "08:00"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pending_facility_cannot_be_booked() {
    let app = TestApp::new().await;
    let id = app.register_facility("owner-1", registration_payload()).await;

    let (status, _) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_drives_lifecycle_to_completion() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let owner = app.token("owner-1", "facility_owner");
    let user = app.token("user-1", "user");

    let (_, booking) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let booking_id = booking["id"].as_str().unwrap();

    // The player cannot confirm their own booking
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/confirm", booking_id), Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Another owner cannot either
    let other_owner = app.token("owner-2", "facility_owner");
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/confirm", booking_id), Some(&other_owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call("POST", &format!("/api/v1/bookings/{}/confirm", booking_id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    // No edge from confirmed to completed
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/complete", booking_id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.call("POST", &format!("/api/v1/bookings/{}/check-in", booking_id), Some(&owner), None).await;
    assert_eq!(body["status"], "checked_in");

    let (_, body) = app.call("POST", &format!("/api/v1/bookings/{}/complete", booking_id), Some(&owner), None).await;
    assert_eq!(body["status"], "completed");

    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(&user), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_and_facility_cancel_refund_in_full() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let owner = app.token("owner-1", "facility_owner");

    let (_, first) = app.book("user-1", &id, "2030-01-14", "08:00", 1).await;
    let (status, body) = app.call(
        "POST",
        &format!("/api/v1/bookings/{}/reject", first["id"].as_str().unwrap()),
        Some(&owner),
        Some(json!({ "reason": "Pitch maintenance" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["refund_percentage"], 100);

    let (_, second) = app.book("user-1", &id, "2030-01-14", "09:00", 1).await;
    let second_id = second["id"].as_str().unwrap();
    app.call("POST", &format!("/api/v1/bookings/{}/confirm", second_id), Some(&owner), None).await;
    let (status, body) = app.call("POST", &format!("/api/v1/bookings/{}/cancel-by-facility", second_id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled_by_facility");
    assert_eq!(body["refund_percentage"], 100);
    assert!(body["cancelled_at"].is_string());
}

#[tokio::test]
async fn test_user_cancellation_applies_notice_policy() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let user = app.token("user-1", "user");

    // A week ahead: outside the 24h window, policy refund applies
    let (_, early) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let (status, body) = app.call(
        "POST",
        &format!("/api/v1/bookings/{}/cancel", early["id"].as_str().unwrap()),
        Some(&user),
        Some(json!({ "reason": "Team could not make it" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled_by_user");
    assert_eq!(body["refund_percentage"], 50);
    assert_eq!(body["cancellation_reason"], "Team could not make it");

    // Ten hours before kick-off: no refund
    let (_, late) = app.book("user-1", &id, "2030-01-14", "19:00", 1).await;
    app.clock.set(Utc.with_ymd_and_hms(2030, 1, 14, 9, 0, 0).unwrap());
    let (status, body) = app.call("POST", &format!("/api/v1/bookings/{}/cancel", late["id"].as_str().unwrap()), Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refund_percentage"], 0);
}

#[tokio::test]
async fn test_only_the_booker_cancels() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;

    let (_, booking) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let intruder = app.token("user-2", "user");
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()), Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call("GET", &format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap()), Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_lists() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let user = app.token("user-1", "user");
    let owner = app.token("owner-1", "facility_owner");

    let (_, kept) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let (_, dropped) = app.book("user-1", &id, "2030-01-14", "08:00", 1).await;
    app.book("user-2", &id, "2030-01-21", "08:00", 1).await;
    app.call("POST", &format!("/api/v1/bookings/{}/cancel", dropped["id"].as_str().unwrap()), Some(&user), None).await;

    let (_, upcoming) = app.call("GET", "/api/v1/bookings?scope=upcoming", Some(&user), None).await;
    let upcoming = upcoming.as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["id"], kept["id"]);

    let (_, past) = app.call("GET", "/api/v1/bookings?scope=past", Some(&user), None).await;
    assert_eq!(past.as_array().unwrap().len(), 1);
    assert_eq!(past[0]["status"], "cancelled_by_user");

    let (_, all) = app.call("GET", "/api/v1/bookings", Some(&user), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, dashboard) = app.call("GET", "/api/v1/owner/bookings", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard.as_array().unwrap().len(), 3);

    let (_, pending) = app.call("GET", &format!("/api/v1/owner/bookings?status=pending&facility_id={}", id), Some(&owner), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let (_, foreign) = app.call("GET", "/api/v1/owner/bookings", Some(&app.token("owner-2", "facility_owner")), None).await;
    assert_eq!(foreign.as_array().unwrap().len(), 0);

    let (status, body) = app.call("GET", &format!("/api/v1/bookings/{}", kept["id"].as_str().unwrap()), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], kept["id"]);
}

#[tokio::test]
async fn test_transition_from_stale_copy_is_refused() {
    let app = TestApp::new().await;
    let id = app.approved_facility().await;
    let (_, created) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    let booking_id = created["id"].as_str().unwrap();
    let repo = &app.state.booking_repo;

    // Two requests load the same pending booking
    let mut cancelled = repo.find_by_id(booking_id).await.unwrap().unwrap();
    let mut confirmed = cancelled.clone();

    cancelled.status = BookingStatus::CancelledByUser;
    repo.update_status(&cancelled, BookingStatus::Pending).await.unwrap();

    confirmed.status = BookingStatus::Confirmed;
    let err = repo.update_status(&confirmed, BookingStatus::Pending).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = repo.find_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CancelledByUser);

    let owner = app.token("owner-1", "facility_owner");
    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/confirm", booking_id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upcoming_uses_facility_local_date() {
    let app = TestApp::new().await;
    let mut payload = registration_payload();
    payload["basic_info"]["timezone"] = json!("Pacific/Kiritimati");
    let id = app.register_facility("owner-1", payload).await;
    app.approve(&id).await;

    let (status, _) = app.book("user-1", &id, "2030-01-14", "18:00", 1).await;
    assert_eq!(status, StatusCode::CREATED);

    // 12:00 UTC on the 14th is already 02:00 on the 15th at UTC+14
    app.clock.set(Utc.with_ymd_and_hms(2030, 1, 14, 12, 0, 0).unwrap());
    let user = app.token("user-1", "user");

    let (_, upcoming) = app.call("GET", "/api/v1/bookings?scope=upcoming", Some(&user), None).await;
    assert_eq!(upcoming.as_array().unwrap().len(), 0);

    let (_, past) = app.call("GET", "/api/v1/bookings?scope=past", Some(&user), None).await;
    assert_eq!(past.as_array().unwrap().len(), 1);
}
