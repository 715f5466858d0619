use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::api::extractors::auth::authenticate;
use crate::state::AppState;
use crate::domain::models::user::Actor;
use std::sync::Arc;
use tracing::Span;

/// Like `AuthUser`, but a missing or invalid token means guest.
pub struct MaybeAuthUser(pub Option<Actor>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let actor = authenticate(parts, &app_state).ok();
        if let Some(actor) = &actor {
            Span::current().record("user_id", actor.user_id.as_str());
        }

        Ok(MaybeAuthUser(actor))
    }
}
