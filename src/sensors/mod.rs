pub mod ina3221;
pub mod w1_therm;

use async_trait::async_trait;
use crate::errors::SensorResult;
use crate::registry::VoltageBusIndex;

pub use ina3221::Ina3221Monitor;
pub use w1_therm::W1ThermDriver;

/// One temperature sensor as reported by a single enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSample {
    pub id: String,
    pub celsius: f64,
}

impl TemperatureSample {
    pub fn new(id: impl Into<String>, celsius: f64) -> Self {
        Self { id: id.into(), celsius }
    }
}

/// Hot-pluggable temperature sensors. The set of sensors may change between
/// calls; any failure fails the whole enumeration.
#[async_trait]
pub trait TemperatureDriver: Send + Sync {
    async fn enumerate(&self) -> SensorResult<Vec<TemperatureSample>>;
    fn name(&self) -> &str;
}

/// A monitor with a fixed set of voltage buses, each readable on its own.
#[async_trait]
pub trait VoltageMonitor: Send + Sync {
    async fn read_voltage(&self, bus: VoltageBusIndex) -> SensorResult<f64>;
    fn name(&self) -> &str;
}
