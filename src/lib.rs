// Public modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod readings;
pub mod registry;
pub mod scheduler;
pub mod sensors;

// Re-export commonly used types
pub use config::{load_exporter_config, ExporterSettings, ScrapeInterval};
pub use errors::{ConfigError, SensorError, SensorResult};
pub use metrics::{MetricSink, PrometheusSink};
pub use readings::Reading;
pub use registry::{SensorFamily, SensorRegistry, VoltageBusIndex};
pub use scheduler::{CycleReport, ScrapeLoop};

use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{reload, EnvFilter, Registry};

use crate::sensors::{Ina3221Monitor, W1ThermDriver};

/// Handle to change the log level once the config file has been read
pub struct LogHandle(reload::Handle<EnvFilter, Registry>);

impl LogHandle {
    pub fn set_level(&self, level: Level) {
        if let Err(e) = self.0.reload(build_filter(level)) {
            warn!("[log] failed to apply level {}: {}", level, e);
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(LevelFilter::from_level(level).into())
}

/// Initialize tracing at `level`; `RUST_LOG` directives are honored too.
pub fn init_tracing(level: Level) -> LogHandle {
    let (filter, handle) = reload::Layer::new(build_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    LogHandle(handle)
}

/// `--debug` wins over the configured level; the default is `info`.
pub fn resolve_log_level(debug: bool, configured: Option<Level>) -> Level {
    if debug {
        Level::DEBUG
    } else {
        configured.unwrap_or(Level::INFO)
    }
}

/// Run the exporter: scrape loop and metrics server side by side.
///
/// Only returns if the metrics server fails or the scrape task dies.
pub async fn run_exporter(settings: ExporterSettings) -> anyhow::Result<()> {
    let sink = Arc::new(PrometheusSink::new());

    let mut scrape = ScrapeLoop::new(settings.registry, sink.clone()).with_temperature(
        Box::new(W1ThermDriver::new(settings.drivers.w1_devices_dir.clone())),
    );
    if scrape.registry().has_voltage() {
        let monitor = Ina3221Monitor::open(
            &settings.drivers.i2c_device,
            settings.drivers.ina3221_address,
        )?;
        scrape = scrape.with_voltage(Box::new(monitor));
    } else {
        info!("[main] no voltage buses configured, voltage family disabled");
    }

    let scrape_task = scrape.spawn(settings.scrape_interval);
    info!("[main] scrape loop launched");

    tokio::select! {
        served = http::serve(sink, settings.listen_addr) => {
            served?;
            Ok(())
        }
        joined = scrape_task => {
            error!("[main] scrape loop stopped unexpectedly");
            joined?;
            anyhow::bail!("scrape loop stopped")
        }
    }
}
