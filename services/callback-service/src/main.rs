use std::net::SocketAddr;

use anyhow::Context;
use callback_common::{bind_listener, init_tracing, shutdown_signal};
use callback_service::{build_router, AppState, CallbackStore, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let guards = init_tracing("callback-service");
    let config = Config::from_env();

    let store = CallbackStore::new(&config.store_path);
    store
        .initialize()
        .await
        .with_context(|| format!("initialize store at {}", config.store_path.display()))?;

    let state = AppState::new(store, config.auth_token.clone());
    let auth_enabled = state.guard.is_enabled();
    let app = build_router(state);
    let listener = bind_listener(config.port)
        .await
        .with_context(|| format!("bind port {}", config.port))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        store = %config.store_path.display(),
        auth_enabled,
        file_logging = guards.file_logging(),
        "callback service listening"
    );
    if !auth_enabled {
        tracing::warn!("AUTH_TOKEN not set, protected routes are open");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("serve")?;

    Ok(())
}
