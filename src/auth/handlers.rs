use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    password::{hash_password, verify_password},
    session::SESSION_COOKIE,
};
use crate::{error::ApiError, pages, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_page() -> Response {
    pages::login_page(None).into_response()
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .build()
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    // One generic rejection regardless of whether the username exists.
    let rejected = || {
        warn!("login rejected");
        (
            StatusCode::UNAUTHORIZED,
            pages::login_page(Some("Invalid username or password")),
        )
            .into_response()
    };

    let Some(user) = state.store.find_user(&form.username).await? else {
        return Ok(rejected());
    };
    if !verify_password(&form.password, &user.password_hash)? {
        return Ok(rejected());
    }

    let token = state.sessions.create(user.id);
    info!(user_id = user.id, "login ok");
    let jar = jar.add(session_cookie(token.to_string()));
    Ok((jar, Redirect::to("/")).into_response())
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        state.sessions.remove(token);
    }
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Redirect::to("/login")).into_response()
}

/// One-time admin seed. Only mounted when BOOTSTRAP_ADMIN is set; the
/// password comes from ADMIN_PASSWORD, never from the source.
#[instrument(skip(state))]
pub async fn bootstrap_admin(State(state): State<AppState>) -> Result<String, ApiError> {
    if state.store.find_user("admin").await?.is_some() {
        return Ok("admin user already exists\n".into());
    }
    let password = state
        .config
        .admin_password
        .as_deref()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("ADMIN_PASSWORD not configured")))?;
    let hash = hash_password(password)?;
    let user = state.store.create_user("admin", &hash).await?;
    info!(user_id = user.id, "bootstrap admin created");
    Ok("admin user created\n".into())
}
