//! HTTP service and coordinated shutdown
//!
//! [`run`] wires the components together and owns the shutdown order:
//! 1. stop accepting HTTP requests
//! 2. wait for in-flight fetches to drain
//! 3. stop the search engine and wait for it to exit

mod routes;
mod shutdown;

pub use routes::ApiError;
pub use shutdown::{idle_timeout, shutdown_signal, track_activity, IdleClock};

use crate::acquire::{Acquirer, InFlight};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::index::MeilisearchIndex;
use crate::storage::open_store;
use crate::supervisor::{ProbePolicy, SearchProcess, Supervisor};
use crate::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub acquirer: Acquirer,
    pub search: Arc<MeilisearchIndex>,
}

/// Builds the router; every request touches `clock`
pub fn router(state: AppState, clock: IdleClock) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/scrape",
            get(routes::scrape_query).post(routes::scrape_json),
        )
        .route(
            "/documents",
            get(routes::list_documents).delete(routes::delete_record),
        )
        .route(
            "/documents/:id",
            get(routes::get_document).delete(routes::delete_document),
        )
        .route("/search", post(routes::search))
        .layer(middleware::from_fn_with_state(clock, track_activity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the service until a shutdown trigger fires and teardown completes
pub async fn run(config: Config) -> Result<()> {
    let store = Arc::new(open_store(Path::new(&config.store.database_path))?);
    let search = Arc::new(MeilisearchIndex::new(&config.search)?);
    let catalog = Arc::new(Catalog::new(store, search.clone()));
    let in_flight = InFlight::new();
    let acquirer = Acquirer::new(&config.fetch, catalog, in_flight.clone())?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let policy = ProbePolicy {
        warmup: config.search.warmup(),
        interval: config.search.probe_interval(),
    };
    let supervisor = Supervisor::start(
        SearchProcess::from_config(&config.search),
        search.clone(),
        policy,
        shutdown_tx,
    )?;

    let listener = match TcpListener::bind(&config.server.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Cannot listen on {}: {}", config.server.listen_addr, e);
            if let Err(e) = supervisor.shutdown().await {
                tracing::error!("Failed to stop search engine: {}", e);
            }
            return Err(e.into());
        }
    };
    tracing::info!("Listening on {}", config.server.listen_addr);

    let clock = IdleClock::new();
    let app = router(AppState { acquirer, search }, clock.clone());
    let trigger = shutdown_signal(shutdown_rx, clock, config.server.idle_timeout());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            trigger.await;
        })
        .await;
    if let Err(e) = &served {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("Server stopped, draining in-flight fetches");
    in_flight.drain().await;

    match supervisor.shutdown().await {
        Ok(status) => tracing::info!("Search engine exited: {}", status),
        Err(e) => tracing::error!("Failed to stop search engine: {}", e),
    }

    tracing::info!("Shut down");
    served?;
    Ok(())
}
