//! One-wire thermometers exposed by the kernel `w1_therm` module.
//!
//! Each thermometer shows up as `<devices_dir>/<family>-<serial>/w1_slave`:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::trace;

use super::{TemperatureDriver, TemperatureSample};
use crate::errors::{SensorError, SensorResult};

/// Family codes of the thermometers handled by `w1_therm`
const THERM_FAMILIES: &[&str] = &["10", "22", "28", "3b", "42"];

const SLAVE_FILE: &str = "w1_slave";

pub struct W1ThermDriver {
    devices_dir: PathBuf,
}

impl W1ThermDriver {
    pub fn new(devices_dir: impl Into<PathBuf>) -> Self {
        Self { devices_dir: devices_dir.into() }
    }

    async fn list_devices(&self) -> SensorResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.devices_dir)
            .await
            .map_err(|e| self.dir_error(e))?;

        let mut devices = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.dir_error(e))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_thermometer(&name) {
                devices.push(name);
            }
        }
        devices.sort();
        Ok(devices)
    }

    async fn read_device(&self, id: &str) -> SensorResult<f64> {
        let path = self.devices_dir.join(id).join(SLAVE_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SensorError::ReadError {
                sensor: id.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;
        parse_slave_output(id, &content)
    }

    fn dir_error(&self, e: std::io::Error) -> SensorError {
        SensorError::ReadError {
            sensor: "w1".to_string(),
            reason: format!("{}: {}", self.devices_dir.display(), e),
        }
    }
}

#[async_trait]
impl TemperatureDriver for W1ThermDriver {
    async fn enumerate(&self) -> SensorResult<Vec<TemperatureSample>> {
        let devices = self.list_devices().await?;
        let mut samples = Vec::with_capacity(devices.len());
        for id in devices {
            let celsius = self.read_device(&id).await?;
            trace!("[w1] {} = {}", id, celsius);
            samples.push(TemperatureSample::new(id, celsius));
        }
        Ok(samples)
    }

    fn name(&self) -> &str {
        "w1_therm"
    }
}

fn is_thermometer(entry: &str) -> bool {
    match entry.split_once('-') {
        Some((family, serial)) => {
            !serial.is_empty() && THERM_FAMILIES.contains(&family.to_ascii_lowercase().as_str())
        }
        None => false,
    }
}

/// Parses the two-line `w1_slave` output into degrees Celsius.
fn parse_slave_output(id: &str, content: &str) -> SensorResult<f64> {
    let mut lines = content.lines();
    let crc_line = lines.next().unwrap_or_default();
    if !crc_line.trim_end().ends_with("YES") {
        return Err(SensorError::NotReady { sensor: id.to_string() });
    }

    let data_error = |reason: &str| SensorError::DataError {
        sensor: id.to_string(),
        reason: reason.to_string(),
    };
    let data_line = lines.next().ok_or_else(|| data_error("missing temperature line"))?;
    let (_, raw) = data_line
        .rsplit_once("t=")
        .ok_or_else(|| data_error("missing t= field"))?;
    let millis: i64 = raw
        .trim()
        .parse()
        .map_err(|_| data_error("t= field is not an integer"))?;

    Ok(millis as f64 / 1000.0)
}
