use crate::controller::ApiResponse;
use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use axum_login::AuthSession;
use domain::{actor::Actor, users};
use log::*;
use tower_sessions::Session;

/// The logged in user, taken from the session and never from the request body.
pub(crate) struct AuthenticatedUser(pub users::Model);

impl AuthenticatedUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Wraps axum_login's AuthSession extractor and touches the session so an active
    // user's session keeps renewing.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: domain::user::AuthSession = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, Json(ApiResponse::error(msg))))?;

        if let Ok(tower_session) = Session::from_request_parts(parts, state).await {
            if let Err(e) = tower_session.save().await {
                warn!("Failed to touch session for activity renewal: {e:?}");
            } else {
                trace!("Session touched successfully for activity renewal");
            }
        }

        match session.user {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Unauthorized")),
            )),
        }
    }
}
