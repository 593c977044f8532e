use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_sessions::Session;

/// Session key the auth layer stores the signed-in user under
pub const USER_ID_KEY: &str = "user_id";

/// Marks the session as belonging to `user_id`. Called by whatever
/// authenticates the user; item handlers only ever read it.
pub async fn set_owner_session(
    session: &Session,
    user_id: i32,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(USER_ID_KEY, user_id).await
}

pub async fn current_owner_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(USER_ID_KEY).await {
        Ok(Some(user_id)) => Some(user_id),
        Ok(None) => None,
        Err(e) => {
            log::error!("Failed to get user_id from session: {}", e);
            None
        }
    }
}

/// Id of the signed-in user owning the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub i32);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match current_owner_id(&session).await {
            Some(owner_id) => Ok(Owner(owner_id)),
            None => {
                log::warn!("Rejected request without a signed-in user");
                let body = json!({
                    "error": "Not logged in",
                    "status": StatusCode::UNAUTHORIZED.as_u16()
                });
                Err((StatusCode::UNAUTHORIZED, axum::Json(body)).into_response())
            }
        }
    }
}
