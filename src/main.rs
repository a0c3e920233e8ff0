//! lifecycle-runner demo binary.
//!
//! Starts a set of heartbeat components and keeps them running until SIGINT,
//! SIGQUIT or SIGTERM (or whatever the config file lists) arrives.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use lifecycle_runner::config::{load_config, RunnerConfig};
use lifecycle_runner::observability::init_logging;
use lifecycle_runner::{Heartbeat, LifecycleError, Runner, RunnerOptions};

#[derive(Parser)]
#[command(name = "lifecycle-runner")]
#[command(about = "Run heartbeat components until a stop signal arrives", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of heartbeat components to register.
    #[arg(long, default_value_t = 2)]
    heartbeats: usize,

    /// Beat interval in milliseconds.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunnerConfig::default(),
    };
    config.apply_env();

    init_logging(&config.observability);

    tracing::info!(
        service = %config.service.name,
        version = %config.service.version,
        start_timeout_secs = config.timeouts.start_secs,
        stop_timeout_secs = config.timeouts.stop_secs,
        "Configuration loaded"
    );

    let mut runner = Runner::new(RunnerOptions::from_config(&config));
    let interval = Duration::from_millis(cli.interval_ms);
    for i in 0..cli.heartbeats {
        runner.append(Heartbeat::new(format!("heartbeat-{i}"), interval));
    }

    match runner.run().await {
        Ok(()) => {}
        Err(LifecycleError::Interrupted { signal }) => {
            tracing::info!(signal = %signal, "Stopped by signal");
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_must_be_positive() {
        assert!(Cli::try_parse_from(["lifecycle-runner", "--interval-ms", "0"]).is_err());

        let cli = Cli::try_parse_from(["lifecycle-runner", "--interval-ms", "250"]).unwrap();
        assert_eq!(cli.interval_ms, 250);
        assert_eq!(cli.heartbeats, 2);
    }
}
