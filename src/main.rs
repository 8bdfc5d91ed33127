use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};

use ursus_exporter::config::DEFAULT_CONFIG_PATH;
use ursus_exporter::{init_tracing, load_exporter_config, resolve_log_level, run_exporter};

/// Exports one-wire temperatures and INA3221 bus voltages as Prometheus gauges.
#[derive(Parser, Debug)]
#[command(name = "ursus-exporter")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(long = "config.file", default_value = DEFAULT_CONFIG_PATH)]
    config_file: PathBuf,

    /// Enable debug log, regardless of global.log_level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log = init_tracing(if args.debug { Level::DEBUG } else { Level::INFO });

    let settings = match load_exporter_config(&args.config_file) {
        Ok(settings) => settings,
        Err(e) => {
            error!("[config] {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = resolve_log_level(args.debug, settings.log_level);
    log.set_level(level);
    if args.debug {
        info!("[main] set debug log level");
    }

    info!("[ursus] starting exporter on {}", settings.listen_addr);
    match run_exporter(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[main] {:#}", e);
            ExitCode::FAILURE
        }
    }
}
