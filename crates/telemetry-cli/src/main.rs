//! Telemetry CLI - emit a log entry or metric update to a collector.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use telemetry_client::{init_logging, ClientConfig, LogLevel, TelemetryClient};

/// Telemetry command-line interface.
#[derive(Parser)]
#[command(name = "telemetry")]
#[command(about = "Send logs and metrics to a telemetry collector")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Collector base URL
    #[arg(long, env = "TELEMETRY_HOST", global = true)]
    host: Option<String>,

    /// Project API key
    #[arg(long, env = "TELEMETRY_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Namespace attached to the emitted item
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a log entry
    Log {
        /// Severity (debug, info, warn, error)
        #[arg(long, default_value = "info", value_parser = parse_level)]
        level: LogLevel,

        /// Log message
        message: String,
    },
    /// Send a metric update
    Metric {
        #[command(subcommand)]
        action: MetricAction,
    },
}

#[derive(Subcommand)]
enum MetricAction {
    /// Replace the metric's value
    Set {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Add a delta to the metric's value
    Change {
        name: String,
        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    raw.parse().map_err(|e| format!("{e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = Some(namespace);
    }

    let client = TelemetryClient::new(config)?;

    match cli.command {
        Commands::Log { level, message } => client.logger().log(level, message),
        Commands::Metric { action } => match action {
            MetricAction::Set { name, value } => client.metrics().set(name, value),
            MetricAction::Change { name, delta } => client.metrics().change(name, delta),
        },
    }

    client.shutdown().await;

    let stats = client.stats();
    let abandoned = stats.logs.abandoned_items + stats.metrics.abandoned_items;
    if abandoned > 0 {
        tracing::error!(abandoned, "Collector did not accept the item");
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_log_command() {
        let cli = Cli::try_parse_from([
            "telemetry",
            "--host",
            "https://collector.example.com",
            "log",
            "--level",
            "warning",
            "disk almost full",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("https://collector.example.com"));
        match cli.command {
            Commands::Log { level, message } => {
                assert_eq!(level, LogLevel::Warn);
                assert_eq!(message, "disk almost full");
            }
            _ => panic!("expected log command"),
        }
    }

    #[test]
    fn parses_negative_metric_values() {
        let cli = Cli::try_parse_from(["telemetry", "metric", "change", "queue_depth", "-3"]).unwrap();

        match cli.command {
            Commands::Metric {
                action: MetricAction::Change { name, delta },
            } => {
                assert_eq!(name, "queue_depth");
                assert_eq!(delta, -3.0);
            }
            _ => panic!("expected metric change"),
        }

        let cli = Cli::try_parse_from(["telemetry", "metric", "set", "temperature", "-5"]).unwrap();

        match cli.command {
            Commands::Metric {
                action: MetricAction::Set { name, value },
            } => {
                assert_eq!(name, "temperature");
                assert_eq!(value, -5.0);
            }
            _ => panic!("expected metric set"),
        }
    }

    #[test]
    fn rejects_unknown_level() {
        let result = Cli::try_parse_from(["telemetry", "log", "--level", "loud", "hi"]);
        assert!(result.is_err());
    }
}
