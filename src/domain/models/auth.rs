use serde::{Deserialize, Serialize};

/// Access token claims issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,

    #[serde(rename = "https://facility-booking.app/claims/role")]
    pub role: String,

    #[serde(rename = "https://facility-booking.app/claims/csrf", default)]
    pub csrf_token: Option<String>,
}
