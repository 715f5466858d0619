use std::env;

use crate::domain::services::registration::DEFAULT_MAX_PHOTO_BYTES;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_public_key: String, // Identity provider public key (Ed25519 PEM)
    pub auth_issuer: String,
    pub auth_audience: String,
    pub max_photo_bytes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://identity.facility-booking.local".to_string()),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "facility-booking-frontend".to_string()),
            max_photo_bytes: env::var("MAX_PHOTO_BYTES")
                .ok()
                .map(|v| v.parse().expect("MAX_PHOTO_BYTES must be a number"))
                .unwrap_or(DEFAULT_MAX_PHOTO_BYTES),
        }
    }
}
