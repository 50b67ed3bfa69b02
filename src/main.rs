use std::net::SocketAddr;

use dotenvy::dotenv;
use mathed::logging::{init_tracing, shutdown_tracer};
use mathed::metrics::{init_metrics, metrics_app};
use mathed::router::init_router;
use mathed::state::init_app_state;
use mathed_db::run_migrations;
use tokio::signal;
use tracing::{error, info, warn};

fn env_port(name: &str, default: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    match init_metrics() {
        Ok(Some(handle)) => {
            let port = env_port("METRICS_PORT", 3001);
            tokio::spawn(async move {
                match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
                    Ok(listener) => {
                        info!(port, "Metrics server listening");
                        if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                            error!(error = %e, "Metrics server stopped");
                        }
                    }
                    Err(e) => error!(error = %e, port, "Failed to bind metrics port"),
                }
            });
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Prometheus recorder not installed"),
    }

    let state = init_app_state().await;
    if let Err(e) = run_migrations(&state.db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let app = init_router(state);

    let port = env_port("PORT", 3000);
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, port, "Failed to bind server port");
            std::process::exit(1);
        }
    };

    info!(port, "🚀 Server running on http://localhost:{}", port);
    info!("📚 Swagger UI available at http://localhost:{}/swagger-ui", port);
    info!("📖 Scalar UI available at http://localhost:{}/scalar", port);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!(error = %e, "Server error");
    }

    shutdown_tracer();
}
