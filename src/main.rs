mod config;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::export::{CommandExporter, NoopExporter, SceneExporter};

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        // A missing .env is normal; a malformed one is worth knowing about.
        if !err.not_found() {
            eprintln!("ignoring .env: {err}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid configuration");

    let exporter: Arc<dyn SceneExporter> = match &config.export_command {
        Some(command) => Arc::new(CommandExporter::new(command.clone())),
        None => Arc::new(NoopExporter),
    };
    tracing::info!(exporter = %exporter.describe(), path = %config.glb_path.display(), "scene exporter ready");

    let state = state::AppState::new(&config, exporter);

    if config.export_command.is_some() {
        // Non-fatal: viewers get a 404 until the next successful sync.
        if let Err(e) = services::sync::run_sync(&state).await {
            tracing::warn!(error = %e, "initial export failed");
        }
    }

    let socket_listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .expect("failed to bind socket port");
    let http_listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .expect("failed to bind http port");

    tracing::info!(addr = %config.socket_addr(), "websocket hub listening");
    tracing::info!(addr = %config.http_addr(), static_dir = %config.static_dir.display(), "scene endpoint listening");

    let socket_server = axum::serve(socket_listener, routes::socket_app(state.clone()))
        .with_graceful_shutdown(shutdown_signal());
    let http_server = axum::serve(http_listener, routes::http_app(state, &config.static_dir))
        .with_graceful_shutdown(shutdown_signal());

    let (socket_result, http_result) = tokio::join!(socket_server.into_future(), http_server.into_future());
    socket_result.expect("websocket server failed");
    http_result.expect("http server failed");
    tracing::info!("glbview stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
    }
}
