use anyhow::Result;
use clap::{Parser, Subcommand};
use geetest_config::{ConfigLoader, GeetestConfig};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Inspect the resolved Geetest CAPTCHA configuration
///
/// Values come from environment overrides, then the first config file found,
/// then built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "geetest-config")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to read instead of searching the standard locations
    ///
    /// Without this flag the first existing file is used:
    /// 1. ./.geetest.toml
    /// 2. $GEETEST_CONFIG
    /// 3. ~/.config/geetest/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Log to file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Print the resolved configuration as JSON, with the key masked
    Show,
    /// Fail unless both geetest-id and geetest-key are set
    Check,
}

fn setup_logging(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    Ok(())
}

// Blank keys are shown as-is so they don't read as configured
fn mask_key(key: &str) -> &str {
    if key.trim().is_empty() {
        key
    } else {
        "****"
    }
}

fn render(config: &GeetestConfig) -> serde_json::Value {
    json!({
        "geetest-id": config.geetest_id(),
        "geetest-key": config.geetest_key().map(mask_key),
        "new-failback": config.new_failback(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, args.log_file)?;

    debug!("Starting geetest-config v{}", env!("CARGO_PKG_VERSION"));

    let loader = match args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };

    let config = loader.load()?;
    info!("Resolved configuration: {:?}", config);

    match args.command.unwrap_or(Command::Show) {
        Command::Show => {
            println!("{}", serde_json::to_string_pretty(&render(&config))?);
        }
        Command::Check => {
            config.require_credentials()?;
            println!("ok");
        }
    }

    Ok(())
}
