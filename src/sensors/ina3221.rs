use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::VoltageMonitor;
use crate::bus::i2c::I2CBus;
use crate::errors::{SensorError, SensorResult};
use crate::registry::VoltageBusIndex;

// Register addresses for the INA3221
const CH1_BUS_VOLTAGE: u8 = 0x02;
const MANUFACTURER_ID: u8 = 0xFE;

const TEXAS_INSTRUMENTS_ID: u16 = 0x5449;
const BUS_VOLTAGE_LSB: f64 = 0.008; // volts per LSB

/// Three-channel INA3221 bus voltage monitor on a single I2C device
pub struct Ina3221Monitor {
    bus: Mutex<I2CBus>,
    id: String,
}

impl Ina3221Monitor {
    /// Opens the device and verifies its manufacturer ID.
    pub fn open(path: &str, address: u8) -> SensorResult<Self> {
        let mut bus = I2CBus::new(path, address).map_err(|source| SensorError::BusNotFound {
            bus: path.to_string(),
            source,
        })?;
        let id = format!("ina3221@{}:{:#04x}", path, address);

        let manufacturer = bus.read_u16_be(MANUFACTURER_ID)?;
        if manufacturer != TEXAS_INSTRUMENTS_ID {
            return Err(SensorError::DataError {
                sensor: id,
                reason: format!(
                    "unexpected manufacturer id {:#06x}, expected {:#06x}",
                    manufacturer, TEXAS_INSTRUMENTS_ID
                ),
            });
        }
        info!("[ina3221] opened {} on {}", id, bus.path());

        Ok(Self { bus: Mutex::new(bus), id })
    }
}

#[async_trait]
impl VoltageMonitor for Ina3221Monitor {
    async fn read_voltage(&self, bus: VoltageBusIndex) -> SensorResult<f64> {
        let mut device = self.bus.lock().await;
        let raw = device.read_u16_be(bus_voltage_register(bus))?;
        Ok(decode_bus_voltage(raw))
    }

    fn name(&self) -> &str {
        &self.id
    }
}

/// Channel registers are interleaved with the shunt registers.
fn bus_voltage_register(bus: VoltageBusIndex) -> u8 {
    CH1_BUS_VOLTAGE + 2 * bus.get()
}

/// Bits 15..3 hold a two's complement count of 8 mV steps.
fn decode_bus_voltage(raw: u16) -> f64 {
    ((raw as i16) >> 3) as f64 * BUS_VOLTAGE_LSB
}
