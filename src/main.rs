use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use motionwatch::{CameraBackend, MotionWatchConfig};

/// Log levels accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "motionwatch")]
#[command(about = "Watch for motion and capture an image of it.")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "motionwatch.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Set the log level
    #[arg(long, value_enum, default_value = "INFO")]
    log_cli_level: LogLevel,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Use the simulated camera instead of the configured backend
    #[arg(long)]
    simulate: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without opening the camera")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("# Motionwatch Configuration File");
        println!("{}", MotionWatchConfig::default().to_toml()?);
        return Ok(());
    }

    init_logging(&args);

    info!("Starting motionwatch v{}", env!("CARGO_PKG_VERSION"));

    let config = MotionWatchConfig::load_from_file(&args.config).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let backend = args.simulate.then_some(CameraBackend::Simulated);

    motionwatch::runtime::run(config, backend).await.map_err(|e| {
        error!("Motion watcher failed: {}", e);
        e
    })?;

    info!("Motionwatch stopped");
    Ok(())
}

fn init_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = args.log_cli_level.as_filter();
    let verbose = args.log_cli_level == LogLevel::Debug;

    // RUST_LOG wins over the command line
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("motionwatch={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}
