//! Growth Tracker HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, and the HTTP router, then serves the API and
//! the metrics endpoint until interrupted.
use anyhow::Context;
use growth_sso::SsoAuthority;
use std::future::Future;
use std::sync::Arc;
use tracker::app::{AppState, build_router};
use tracker::auth::session::SessionKeys;
use tracker::config::{StorageBackend, TrackerConfig};
use tracker::notify::Notifier;
use tracker::observability;
use tracker::store::TrackerStore;
use tracker::store::memory::InMemoryStore;
use tracker::store::postgres::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TrackerConfig::from_env_or_yaml().context("tracker config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: TrackerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("growth-tracker");
    if config.uses_default_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; sessions are signed with the development default");
    }
    let state = build_state(config.clone()).await?;
    tracing::info!(
        backend = state.store.backend_name(),
        durable = state.store.is_durable(),
        sso_public_key = state.sso.has_public_key(),
        sso_private_key = state.sso.has_private_key(),
        dev_endpoints = state.dev_endpoints,
        "tracker state ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);
    let addr = config.bind_addr;
    tracing::info!(%addr, "tracker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: TrackerConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn TrackerStore + Send + Sync> = match config.storage {
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };

    Ok(AppState {
        store,
        sessions: SessionKeys::from_secret(&config.jwt_secret),
        sso: SsoAuthority::new(config.sso_public_key, config.sso_private_key),
        notifier: Notifier::default(),
        dev_endpoints: config.dev_endpoints,
    })
}
