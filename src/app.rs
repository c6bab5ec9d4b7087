use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, extractors::require_session};
use crate::config::GuardPolicy;
use crate::pages;
use crate::recipes;
use crate::state::AppState;

pub fn build_app(state: AppState) -> Router {
    let guard = middleware::from_fn_with_state(state.clone(), require_session);

    let mut home = Router::new().route("/", get(pages::home));
    let mut read = recipes::read_routes();
    let mut write = recipes::write_routes();

    // The guard policy table: which route groups require a session.
    match state.config.guard {
        GuardPolicy::Open => {}
        GuardPolicy::Mutations => {
            write = write.route_layer(guard);
        }
        GuardPolicy::Full => {
            home = home.route_layer(guard.clone());
            read = read.route_layer(guard.clone());
            write = write.route_layer(guard);
        }
    }

    Router::new()
        .merge(home)
        .merge(read)
        .merge(write)
        .merge(auth::router(state.config.bootstrap_admin))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
