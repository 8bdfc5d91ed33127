//! Gauge sink the scrape loop publishes into.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::readings::Reading;
use crate::registry::SensorFamily;

pub const METRIC_PREFIX: &str = "ursus";

/// Destination for readings. Implementations must be safe to write from
/// the scrape loop while the exposition server reads.
pub trait MetricSink: Send + Sync {
    /// Overwrites the gauge identified by the reading's labels.
    fn set_gauge(&self, reading: &Reading);
}

pub type SharedSink = Arc<PrometheusSink>;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TemperatureLabels {
    pub sensor_id: String,
    pub friendly_name: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct VoltageLabels {
    pub voltage_bus: String,
    pub friendly_name: String,
}

type FloatGauge = Gauge<f64, AtomicU64>;

/// `ursus_temperature` and `ursus_voltage` gauge families
pub struct PrometheusSink {
    registry: Registry,
    temperature: Family<TemperatureLabels, FloatGauge>,
    voltage: Family<VoltageLabels, FloatGauge>,
}

impl PrometheusSink {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(METRIC_PREFIX);
        let temperature = Family::<TemperatureLabels, FloatGauge>::default();
        let voltage = Family::<VoltageLabels, FloatGauge>::default();

        registry.register(
            "temperature",
            "Temperature of engine parts in Celsius degrees",
            temperature.clone(),
        );
        registry.register(
            "voltage",
            "Bus voltage in volts",
            voltage.clone(),
        );

        Self {
            registry,
            temperature,
            voltage,
        }
    }

    /// Text exposition of every gauge.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSink for PrometheusSink {
    fn set_gauge(&self, reading: &Reading) {
        match &reading.family {
            SensorFamily::Temperature { id } => {
                let labels = TemperatureLabels {
                    sensor_id: id.clone(),
                    friendly_name: reading.friendly_name.clone(),
                };
                self.temperature.get_or_create(&labels).set(reading.value);
            }
            SensorFamily::VoltageBus { index } => {
                let labels = VoltageLabels {
                    voltage_bus: index.bus_name(),
                    friendly_name: reading.friendly_name.clone(),
                };
                self.voltage.get_or_create(&labels).set(reading.value);
            }
        }
    }
}
