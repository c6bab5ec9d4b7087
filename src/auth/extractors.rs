use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use super::session::SESSION_COOKIE;
use crate::{error::ApiError, state::AppState};

fn session_token(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

/// Resolves the session cookie to the logged-in user id.
pub struct SessionUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user_id = session_token(&jar)
            .and_then(|token| state.sessions.user_id(token))
            .ok_or(ApiError::Unauthorized)?;
        Ok(SessionUser(user_id))
    }
}

/// Route-group guard. API paths get a 401 body; page paths are sent to
/// the login form.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let authenticated = session_token(&jar)
        .and_then(|token| state.sessions.user_id(token))
        .is_some();
    if authenticated {
        return next.run(req).await;
    }
    if req.uri().path().starts_with("/api/") {
        ApiError::Unauthorized.into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}
