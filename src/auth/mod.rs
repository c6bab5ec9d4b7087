pub mod extractors;
pub mod handlers;
pub mod password;
pub mod session;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router(bootstrap_admin: bool) -> Router<AppState> {
    let mut router = Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout));
    if bootstrap_admin {
        router = router.route("/crear-admin", get(handlers::bootstrap_admin));
    }
    router
}
