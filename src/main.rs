// src/main.rs

use axum::serve;
use clap::Parser;
use openrouter_key_selector::{
    cli::{Cli, Commands, KeyCommands},
    config, metrics, run, setup_configuration, AppError, KeySelector,
};
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!(signal = "Ctrl+C", "Received signal. Initiating graceful shutdown...") },
        () = terminate => { info!(signal = "Terminate", "Received signal. Initiating graceful shutdown...") },
    }
}

fn init_tracing(json_logs: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout принадлежит выводу команд `keys`
    if json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(!cli.no_json_logs);

    match cli.resolved_command() {
        Commands::Serve { port } => serve_command(&cli.config, port).await,
        Commands::Keys { action } => keys_command(&cli.config, action).await,
        Commands::CheckConfig { file } => {
            let path = file.unwrap_or_else(|| cli.config.clone());
            check_config_command(&path)
        }
    }
}

async fn serve_command(config_path: &Path, port_override: Option<u16>) -> Result<(), AppError> {
    if let Err(e) = metrics::initialize_metrics() {
        warn!(error = %e, "Metrics recorder not installed, /metrics will return 503");
    }

    let (app, state) = run(config_path).await.map_err(|e| {
        eprintln!("Application setup error: {e}");
        e
    })?;

    let port = port_override.unwrap_or(state.config.server.port);
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, port)
        .parse()
        .map_err(|e| {
            AppError::config_validation(
                format!("Invalid bind address '{}:{port}': {e}", state.config.server.host),
                Some("server.host".to_string()),
            )
        })?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!(server.address = %addr, error = ?e, "Failed to bind to address. Exiting.");
        AppError::from(e)
    })?;
    info!(server.address = %addr, "Server listening");

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = ?e, "Server run loop encountered an error. Exiting.");
            AppError::from(e)
        })?;

    info!("Server shut down gracefully.");
    Ok(())
}

async fn keys_command(config_path: &Path, action: KeyCommands) -> Result<(), AppError> {
    let app_config = setup_configuration(config_path)?;

    if action == KeyCommands::List {
        for label in app_config.credential_labels() {
            println!("{label}");
        }
        return Ok(());
    }

    let selector = KeySelector::from_config(&app_config)?;
    match action {
        KeyCommands::Refresh => {
            let statuses = selector.refresh_all().await;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        KeyCommands::Select => {
            let selected = selector.select().await?;
            let body = serde_json::json!({
                "label": selected.label,
                "source": selected.source.as_str(),
            });
            println!("{body}");
        }
        KeyCommands::List => {}
    }
    Ok(())
}

fn check_config_command(path: &Path) -> Result<(), AppError> {
    match config::load_config(path) {
        Ok(app_config) => {
            println!(
                "Configuration OK: {} key(s) configured ({})",
                app_config.credentials.len(),
                app_config.credential_labels().join(", ")
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {e}");
            std::process::exit(1);
        }
    }
}
