use anyhow::{Context, Result};
use clap::Parser;
use roomroast_server::{build_router, config::Config, AppState};
use tracing_subscriber::EnvFilter;

/// Serve the Roast My Room API in front of a local Ollama
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML config file. Anything it leaves out keeps its default.
    #[clap(long)]
    config: Option<String>,

    /// The address and optionally port to bind to (overrides the config file)
    #[clap(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .apply_env()?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    // initialize tracing
    let _guard = match &config.server.log_dir {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "access.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .json()
                .with_writer(non_blocking)
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            None
        }
    };

    tracing::info!(
        "Using inference server {} (vision: {}, text: {})",
        config.inference.base_url,
        config.inference.vision_model,
        config.inference.text_model
    );

    let address = config.server.address.clone();
    let tls = config.server.tls.clone();
    let app = build_router(AppState::new(config)?);

    // In development, use HTTP. With a certificate configured, use HTTPS.
    if let Some(tls) = tls {
        rustls::crypto::ring::default_provider()
            .install_default()
            .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr = address.parse().context("Parsing bind address")?;
        tracing::info!("Listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Binding {}", address))?;
        tracing::info!("Listening on http://{}", address);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
