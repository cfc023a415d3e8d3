use std::path::PathBuf;

use clap::Parser;

use spa_proxy::config::{load_config, ConfigSource, DEFAULT_ENV_FILE};
use spa_proxy::lifecycle::startup;
use spa_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "spa-proxy")]
#[command(about = "Serve a single-page app and proxy /api to its backend", long_about = None)]
struct Cli {
    /// Configuration mode: "test" reads the env file, anything else reads
    /// DIR, PORT and URL from the environment.
    mode: String,

    /// Env file used in test mode.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init();

    tracing::info!("spa-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let source = ConfigSource::from_mode(&cli.mode, cli.env_file);
    let config = load_config(&source).inspect_err(|e| {
        tracing::error!(source = ?source, error = %e, "Invalid configuration");
    })?;

    tracing::info!(
        root_dir = %config.root_dir().display(),
        listen_port = config.listen_port(),
        upstream = %config.upstream_origin(),
        "Configuration loaded"
    );

    startup::run(&config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
