use std::{net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use unit_observer::{
    build_app,
    config::Config,
    logging,
    process::{CommandRunner, TokioCommandRunner},
    systemd_client::SystemdCliClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let shutdown = CancellationToken::new();
    probe_tools(&config, &shutdown).await;

    let provider = Arc::new(SystemdCliClient::new(config.tools.clone()));
    let bind_socket = config.bind_socket()?;
    let state = AppState::new(
        config.api_token.clone(),
        config.allowed_cidr,
        provider,
        shutdown.clone(),
    );
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        allowed_cidr = ?config.allowed_cidr,
        "server starting"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

    info!("server stopped");
    Ok(())
}

/// Missing tools are not fatal: queries degrade to empty results.
async fn probe_tools(config: &Config, cancel: &CancellationToken) {
    let runner = TokioCommandRunner::new();
    let version_arg = ["--version".to_string()];

    for tool in [&config.tools.systemctl, &config.tools.journalctl] {
        match runner.run(tool, &version_arg, cancel).await {
            Ok(output) if output.success() => {
                let version = output.stdout.lines().next().unwrap_or_default();
                info!(tool = %tool, version = %version, "external tool available");
            }
            Ok(output) => warn!(
                tool = %tool,
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "external tool unavailable, queries will return empty results"
            ),
            Err(_) => return,
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, cancelling in-flight queries");
    shutdown.cancel();
}
