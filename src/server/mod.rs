//! HTTP surface over the session registry
//!
//! The router exposes the search endpoints and, when a static directory is
//! configured, serves the browser client from `/`.

mod routes;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::events::EventLog;
use crate::session::SessionRegistry;
use crate::WikiRaceError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

/// Builds the application router
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/find_path", post(routes::find_path))
        .route("/get_results/:search_id", get(routes::get_results))
        .route("/abort_search", post(routes::abort_search))
        .route("/logs", get(routes::logs))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Binds the listening socket
pub async fn bind(addr: SocketAddr) -> crate::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| WikiRaceError::Bind { addr, source })
}

/// Serves `router` on `listener` until `shutdown` resolves
pub async fn serve_on<F>(listener: TcpListener, router: Router, shutdown: F) -> crate::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Runs the HTTP server described by `config` until Ctrl-C
pub async fn serve(config: &Config) -> crate::Result<()> {
    let events = EventLog::new(config.search.log_capacity);
    let registry = Arc::new(SessionRegistry::from_config(config, events)?);
    let listener = bind(config.server.bind).await?;
    let sweeper = registry.spawn_sweeper(sweep_period(config.search.retention_secs));

    if let Some(dir) = &config.server.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
    }

    let app = router(
        AppState::new(Arc::clone(&registry)),
        config.server.static_dir.as_deref(),
    );
    let outcome = serve_on(listener, app, shutdown_signal()).await;

    let aborted = registry.abort(None);
    if aborted > 0 {
        tracing::info!("Aborted {} running searches on shutdown", aborted);
    }
    sweeper.abort();

    outcome
}

/// Sweeps a few times per retention period, at most once a minute
fn sweep_period(retention_secs: u64) -> Duration {
    Duration::from_secs((retention_secs / 4).clamp(1, 60))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_period() {
        assert_eq!(sweep_period(0), Duration::from_secs(1));
        assert_eq!(sweep_period(40), Duration::from_secs(10));
        assert_eq!(sweep_period(900), Duration::from_secs(60));
    }
}
