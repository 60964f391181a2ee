use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use signet_core::{NewUser, Role};
use signet_server::api::AppState;
use signet_server::auth::AuthProvider;
use signet_server::blob_factory::create_blob_store;
use signet_server::config::SignetConfig;
use signet_server::store_factory::create_store;
use signet_workflow::{WorkflowEngine, WorkflowEngineBuilder};

/// Signet document signature workflow server.
#[derive(Parser, Debug)]
#[command(name = "signet-server", about = "HTTP server for the Signet signature workflow")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "signet.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run database migrations for the configured store, then exit.
    Migrate,
    /// Register a user and print a bearer token for it.
    CreateUser {
        username: String,
        email: String,
        /// One of `admin`, `signer`, `viewer`.
        #[arg(long, default_value = "signer")]
        role: String,
        /// Job title shown next to the signer's name.
        #[arg(long)]
        post: Option<String>,
    },
}

async fn build_engine(config: &SignetConfig) -> Result<Arc<WorkflowEngine>, Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await?;
    let blobs = create_blob_store(&config.blob).await?;
    let engine = WorkflowEngineBuilder::new()
        .store(store)
        .blobs(blobs)
        .config(config.workflow.clone())
        .build()?;
    Ok(Arc::new(engine))
}

fn jwt_secret(config: &SignetConfig) -> String {
    if let Ok(secret) = std::env::var("SIGNET_JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Some(secret) = config.auth.jwt_secret.clone() {
        return secret;
    }
    warn!("no JWT secret configured, generating a random one; tokens will not survive a restart");
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config: SignetConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    signet_server::telemetry::init();

    match cli.command {
        Some(Commands::Migrate) => {
            create_store(&config.store).await?;
            info!(backend = %config.store.backend, "migrations complete");
            return Ok(());
        }
        Some(Commands::CreateUser {
            username,
            email,
            role,
            post,
        }) => {
            let role: Role = role.parse()?;
            if config.store.backend == "memory" {
                warn!("memory store selected; the user will not outlive this process");
            }
            let engine = build_engine(&config).await?;
            let user = engine
                .register_user(NewUser {
                    username,
                    email,
                    role,
                    post,
                })
                .await?;
            let auth = AuthProvider::new(
                &jwt_secret(&config),
                config.auth.jwt_expiry_seconds,
                engine,
            );
            let token = auth.issue_token(&user)?;
            info!(user_id = %user.id, role = %user.role, "user created");
            println!("{token}");
            return Ok(());
        }
        None => {}
    }

    let engine = build_engine(&config).await?;
    let auth = Arc::new(AuthProvider::new(
        &jwt_secret(&config),
        config.auth.jwt_expiry_seconds,
        engine.clone(),
    ));

    let state = AppState {
        engine,
        auth,
        external_url: config.server.external_url.clone(),
        max_body_bytes: config.uploads.max_body_bytes,
    };
    let app = signet_server::api::router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "signet-server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    let _ = stop_tx.send(());
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    if tokio::time::timeout(shutdown_timeout, server).await.is_err() {
        warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, dropping open connections"
        );
    }

    info!("signet-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
