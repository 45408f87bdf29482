//! BlackBox CLI - main entry point

use clap::Parser;
use tracing::{error, info};

use blackbox_cli::{
    app::{shutdown_signal, BlackboxApp},
    cli::Cli,
    config::AppConfig,
    error::Result,
};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    setup_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(end) => {
            info!(?end, "BlackBox exited");
            0
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    // Stdin reads park a blocking thread that would hold up runtime shutdown
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<blackbox_cli::SessionEnd> {
    // Load configuration, then let flags override it
    let mut config = load_configuration(&cli)?;
    config.apply_overrides(&cli);
    config.validate()?;

    BlackboxApp::new(config).run(&cli, shutdown_signal()).await
}

/// Setup logging based on verbosity level. Logs go to stderr so they never
/// interleave with chat lines on stdout.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path.display());
        Ok(AppConfig::load_from_file(config_path)?)
    } else {
        info!("Using default configuration");
        Ok(AppConfig::default())
    }
}
