use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts, Method, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::{Actor, Role};
use std::str::FromStr;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{debug, Span};

pub struct AuthUser(pub Actor);

enum TokenSource {
    Bearer,
    Cookie,
}

fn find_token(parts: &Parts) -> Option<(String, TokenSource)> {
    let bearer = parts.headers.get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    if let Some(token) = bearer {
        return Some((token, TokenSource::Bearer));
    }

    parts.extensions.get::<Cookies>()
        .and_then(|cookies| cookies.get("access_token"))
        .map(|cookie| (cookie.value().to_string(), TokenSource::Cookie))
}

/// Verifies the identity provider's token and, for cookie sessions on
/// mutating requests, the double-submit CSRF header.
pub(crate) fn authenticate(parts: &Parts, state: &AppState) -> Result<Actor, StatusCode> {
    let (token, source) = find_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;

    let decoding_key = DecodingKey::from_ed_pem(state.config.jwt_public_key.as_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_audience(&[state.config.auth_audience.as_str()]);
    validation.set_issuer(&[state.config.auth_issuer.as_str()]);

    let claims = decode::<Claims>(&token, &decoding_key, &validation)
        .map_err(|e| {
            debug!("Rejected access token: {}", e);
            StatusCode::UNAUTHORIZED
        })?
        .claims;

    let safe = [Method::GET, Method::HEAD, Method::OPTIONS].contains(&parts.method);
    if matches!(source, TokenSource::Cookie) && !safe {
        let csrf_header_val = parts.headers.get("X-CSRF-Token")
            .ok_or(StatusCode::FORBIDDEN)?
            .to_str()
            .map_err(|_| StatusCode::FORBIDDEN)?;

        if claims.csrf_token.as_deref() != Some(csrf_header_val) {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    let role = Role::from_str(&claims.role).map_err(|_| StatusCode::FORBIDDEN)?;
    Ok(Actor::new(claims.sub, role))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let actor = authenticate(parts, &app_state)?;

        Span::current().record("user_id", actor.user_id.as_str());
        Span::current().record("role", actor.role.as_str());

        Ok(AuthUser(actor))
    }
}
