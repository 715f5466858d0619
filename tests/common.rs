use facility_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    domain::ports::Clock,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_facility_repo::SqliteFacilityRepo,
        sqlite_photo_repo::SqlitePhotoRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ISSUER: &str = "test-issuer";
pub const AUDIENCE: &str = "test-frontend";

/// Settable clock; starts on Monday 2030-01-07 at 10:30 UTC.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn monday_1030() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 7, 10, 30, 0).unwrap()
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub clock: Arc<FixedClock>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: ISSUER.to_string(),
            auth_audience: AUDIENCE.to_string(),
            max_photo_bytes: 5 * 1024 * 1024,
        };

        let clock = Arc::new(FixedClock(Mutex::new(monday_1030())));

        let state = Arc::new(AppState {
            config,
            facility_repo: Arc::new(SqliteFacilityRepo::new(pool.clone())),
            photo_repo: Arc::new(SqlitePhotoRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            clock: clock.clone(),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            clock,
        }
    }

    /// Signs an access token the way the identity provider would.
    pub fn token(&self, user_id: &str, role: &str) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + 3600,
            iat: now,
            role: role.to_string(),
            csrf_token: Some(format!("csrf-{}", user_id)),
        };
        let key = EncodingKey::from_ed_pem(include_bytes!("../tests/keys/test_private.pem")).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    /// Registers a facility for `owner_id` and returns its id (still pending).
    pub async fn register_facility(&self, owner_id: &str, payload: Value) -> String {
        let token = self.token(owner_id, "facility_owner");
        let (status, body) = self.call("POST", "/api/v1/facilities", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn approve(&self, facility_id: &str) {
        let admin = self.token("admin-1", "admin");
        let (status, body) = self.call(
            "POST",
            &format!("/api/v1/admin/facilities/{}/verification", facility_id),
            Some(&admin),
            Some(json!({ "status": "approved" })),
        ).await;
        assert_eq!(status, StatusCode::OK, "approval failed: {}", body);
    }

    /// Registered and approved facility owned by `owner-1`.
    pub async fn approved_facility(&self) -> String {
        let id = self.register_facility("owner-1", registration_payload()).await;
        self.approve(&id).await;
        id
    }

    pub async fn book(&self, user_id: &str, facility_id: &str, date: &str, start: &str, hours: u32) -> (StatusCode, Value) {
        let token = self.token(user_id, "user");
        self.call("POST", "/api/v1/bookings", Some(&token), Some(json!({
            "facility_id": facility_id,
            "sport_type": "Football",
            "date": date,
            "start_time": start,
            "duration_hours": hours,
            "number_of_players": 8
        }))).await
    }
}

/// Falcon Arena: Football on Mondays 08:00-12:00 at 50 and 18:00-22:00 at 80,
/// Saturdays 10:00-14:00 at 60, 24h cancellation notice with 50% refund.
#[allow(dead_code)]
pub fn registration_payload() -> Value {
    json!({
        "basic_info": {
            "facility_name_en": "Falcon Arena",
            "facility_name_ar": "ساحة الصقر",
            "facility_description_en": "Five-a-side football pitches",
            "facility_description_ar": "ملاعب كرة قدم خماسية",
            "address_en": "King Fahd Road",
            "address_ar": "طريق الملك فهد",
            "country_code": "SA",
            "city": "Riyadh",
            "currency": "SAR",
            "phone": "+966 11 555 0101",
            "email": "owner@falcon.example",
            "timezone": "UTC"
        },
        "sport_types": [{
            "name_en": "Football",
            "name_ar": "كرة القدم",
            "pricing": {
                "monday": {
                    "isWeekend": false,
                    "timeSlots": [
                        { "start": "18:00", "end": "22:00", "price": 80 },
                        { "start": "08:00", "end": "12:00", "price": 50 }
                    ]
                },
                "saturday": {
                    "isWeekend": true,
                    "timeSlots": [{ "start": "10:00", "end": "14:00", "price": 60 }]
                }
            },
            "facility": { "field_type": "outdoor", "max_capacity": 10 }
        }],
        "amenities": [{ "name_en": "Parking", "name_ar": "مواقف" }],
        "rules": [],
        "cancellation_policy": { "hours": 24, "refund_percentage": 50 },
        "photos": [
            { "url": "https://cdn.example/falcon-1.jpg", "content_type": "image/jpeg", "size_bytes": 120000 },
            { "url": "https://cdn.example/falcon-2.png", "content_type": "image/png", "size_bytes": 80000 }
        ],
        "main_photo_index": 1
    })
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
