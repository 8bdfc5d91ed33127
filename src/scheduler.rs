use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::ScrapeInterval;
use crate::errors::SensorError;
use crate::metrics::MetricSink;
use crate::readings::Reading;
use crate::registry::{SensorFamily, SensorRegistry, VoltageBusIndex};
use crate::sensors::{TemperatureDriver, VoltageMonitor};

/// Outcome of one scrape cycle
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    /// Readings handed to the sink
    pub published: usize,
    /// The temperature family was skipped this cycle
    pub temperature_failed: bool,
    /// Voltage buses whose read failed this cycle
    pub failed_buses: Vec<VoltageBusIndex>,
}

/// Polls every configured sensor family once per interval and publishes
/// the readings. Families are polled in a fixed order: temperature, then
/// voltage.
pub struct ScrapeLoop {
    registry: SensorRegistry,
    temperature: Option<Box<dyn TemperatureDriver>>,
    voltage: Option<Box<dyn VoltageMonitor>>,
    sink: Arc<dyn MetricSink>,
}

impl ScrapeLoop {
    pub fn new(registry: SensorRegistry, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            registry,
            temperature: None,
            voltage: None,
            sink,
        }
    }

    pub fn with_temperature(mut self, driver: Box<dyn TemperatureDriver>) -> Self {
        self.temperature = Some(driver);
        self
    }

    pub fn with_voltage(mut self, monitor: Box<dyn VoltageMonitor>) -> Self {
        self.voltage = Some(monitor);
        self
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Runs a single cycle. Driver failures are logged and recorded in the
    /// report; they never abort the cycle.
    pub async fn scrape_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        if let Some(driver) = &self.temperature {
            self.poll_temperature(driver.as_ref(), &mut report).await;
        }
        if let Some(monitor) = &self.voltage {
            self.poll_voltage(monitor.as_ref(), &mut report).await;
        }

        debug!(
            "[scrape] cycle done: {} published, temperature_failed={}, failed_buses={:?}",
            report.published, report.temperature_failed, report.failed_buses
        );
        report
    }

    async fn poll_temperature(&self, driver: &dyn TemperatureDriver, report: &mut CycleReport) {
        let samples = match driver.enumerate().await {
            Ok(samples) => samples,
            Err(SensorError::NotReady { sensor }) => {
                warn!(
                    "[scrape] {}: sensor {} not ready, skipping temperature readings this cycle",
                    driver.name(),
                    sensor
                );
                report.temperature_failed = true;
                return;
            }
            Err(e) => {
                warn!(
                    "[scrape] {}: {}, skipping temperature readings this cycle",
                    driver.name(),
                    e
                );
                report.temperature_failed = true;
                return;
            }
        };

        for sample in samples {
            debug!("[scrape] sensor {} return {}", sample.id, sample.celsius);
            self.publish(SensorFamily::temperature(sample.id), sample.celsius);
            report.published += 1;
        }
    }

    async fn poll_voltage(&self, monitor: &dyn VoltageMonitor, report: &mut CycleReport) {
        for index in VoltageBusIndex::ALL {
            match monitor.read_voltage(index).await {
                Ok(volts) => {
                    debug!("[scrape] {} return {}", index.bus_name(), volts);
                    self.publish(SensorFamily::voltage(index), volts);
                    report.published += 1;
                }
                Err(e) => {
                    warn!(
                        "[scrape] {}: {} read failed: {}",
                        monitor.name(),
                        index.bus_name(),
                        e
                    );
                    report.failed_buses.push(index);
                }
            }
        }
    }

    fn publish(&self, family: SensorFamily, value: f64) {
        if self.registry.lookup(&family).is_none() {
            debug!("[scrape] sensor {} hasn't a friendly name", family.key_label());
        }
        let friendly_name = self.registry.display_name(&family);
        self.sink.set_gauge(&Reading::new(family, friendly_name, value));
    }

    /// Scrapes forever, once per `interval`. The first cycle starts
    /// immediately; a zero interval runs cycles back to back.
    pub async fn run(self, interval: ScrapeInterval) {
        info!("[scrape] starting scrape loop every {}", interval);

        if interval.is_zero() {
            loop {
                self.scrape_once().await;
                tokio::task::yield_now().await;
            }
        }

        let mut ticker = tokio::time::interval(interval.as_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.scrape_once().await;
        }
    }

    pub fn spawn(self, interval: ScrapeInterval) -> JoinHandle<()> {
        tokio::spawn(self.run(interval))
    }
}
