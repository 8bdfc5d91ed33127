use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};

use super::duration::{parse_scrape_interval, ScrapeInterval};
use crate::errors::{ConfigError, ConfigResult};
use crate::registry::{SensorRegistry, VoltageBusIndex};

pub const DEFAULT_LISTEN_PORT: u16 = 9271;
pub const DEFAULT_W1_DEVICES_DIR: &str = "/sys/bus/w1/devices";
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";
pub const DEFAULT_INA3221_ADDRESS: u8 = 0x40;

/// Root of the YAML document
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub global: Option<GlobalSection>,
    #[serde(default)]
    pub sensors: Option<SensorsSection>,
    #[serde(default)]
    pub drivers: Option<DriverSettings>,
}

/// `global:` section; every key is optional
#[derive(Debug, Default, Deserialize)]
pub struct GlobalSection {
    pub listen_address: Option<IpAddr>,
    pub listen_port: Option<u16>,
    pub scrape_interval: Option<String>,
    pub log_level: Option<String>,
}

/// `sensors:` section.
///
/// Older configs list temperature sensors directly under `sensors:`; that
/// layout is still accepted.
#[derive(Debug)]
pub enum SensorsSection {
    Legacy(Vec<TemperatureEntry>),
    Families(SensorFamilies),
}

#[derive(Debug, Default, Deserialize)]
pub struct SensorFamilies {
    #[serde(default)]
    pub temperature: Option<Vec<TemperatureEntry>>,
    #[serde(default)]
    pub voltage: Option<Vec<VoltageEntry>>,
}

// Dispatches on the YAML node kind so field errors keep their path
// (e.g. `sensors.voltage[0].bus`).
impl<'de> Deserialize<'de> for SensorsSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = SensorsSection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of sensor families or a list of temperature sensors")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                Vec::deserialize(SeqAccessDeserializer::new(seq)).map(SensorsSection::Legacy)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                SensorFamilies::deserialize(MapAccessDeserializer::new(map))
                    .map(SensorsSection::Families)
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureEntry {
    pub sensor_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoltageEntry {
    pub bus: i64,
    #[serde(default)]
    pub name: String,
}

/// Where the hardware adapters find their devices
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub w1_devices_dir: PathBuf,
    pub i2c_device: String,
    pub ina3221_address: u8,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            w1_devices_dir: PathBuf::from(DEFAULT_W1_DEVICES_DIR),
            i2c_device: DEFAULT_I2C_DEVICE.to_string(),
            ina3221_address: DEFAULT_INA3221_ADDRESS,
        }
    }
}

/// Fully validated exporter configuration
#[derive(Debug, Clone)]
pub struct ExporterSettings {
    pub listen_addr: SocketAddr,
    pub scrape_interval: ScrapeInterval,
    pub log_level: Option<Level>,
    pub registry: SensorRegistry,
    pub drivers: DriverSettings,
}

impl ConfigFile {
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validates the document and resolves every default.
    pub fn into_settings(self) -> ConfigResult<ExporterSettings> {
        let global = self.global.unwrap_or_default();

        let listen_port = global.listen_port.unwrap_or(DEFAULT_LISTEN_PORT);
        let listen_ip = global
            .listen_address
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        info!("[config] use {} TCP port", listen_port);

        let scrape_interval = match global.scrape_interval.as_deref() {
            Some(raw) => {
                debug!("[config] parse scrape_interval option: {}", raw);
                parse_scrape_interval(raw)?
            }
            None => ScrapeInterval::default(),
        };
        info!("[config] set scrape_interval to: {}", scrape_interval);

        let log_level = global
            .log_level
            .as_deref()
            .map(parse_log_level)
            .transpose()?;

        let (temperature, voltage) = match self.sensors {
            Some(SensorsSection::Families(families)) => (
                families.temperature.unwrap_or_default(),
                families.voltage.unwrap_or_default(),
            ),
            Some(SensorsSection::Legacy(temperature)) => (temperature, Vec::new()),
            None => (Vec::new(), Vec::new()),
        };

        Ok(ExporterSettings {
            listen_addr: SocketAddr::new(listen_ip, listen_port),
            scrape_interval,
            log_level,
            registry: build_registry(temperature, voltage)?,
            drivers: self.drivers.unwrap_or_default(),
        })
    }
}

fn build_registry(
    temperature: Vec<TemperatureEntry>,
    voltage: Vec<VoltageEntry>,
) -> ConfigResult<SensorRegistry> {
    let mut registry = SensorRegistry::new();

    for entry in temperature {
        info!(
            "[registry] sensor: {} has friendly_name: {}",
            entry.sensor_id, entry.name
        );
        if let Some(previous) = registry
            .temperature
            .insert(entry.sensor_id.clone(), entry.name)
        {
            warn!(
                "[registry] sensor {} configured twice, replacing friendly_name {}",
                entry.sensor_id, previous
            );
        }
    }

    for entry in voltage {
        let index = VoltageBusIndex::new(entry.bus).ok_or_else(|| ConfigError::InvalidValue {
            field: "sensors.voltage[].bus".to_string(),
            reason: format!("bus {} is out of range, expected 0, 1 or 2", entry.bus),
        })?;
        info!(
            "[registry] voltage bus: {} has friendly_name: {}",
            index, entry.name
        );
        if let Some(previous) = registry.voltage.insert(index, entry.name) {
            warn!(
                "[registry] voltage bus {} configured twice, replacing friendly_name {}",
                index, previous
            );
        }
    }

    Ok(registry)
}

/// Accepts the usual level names case-insensitively, plus `warning` and
/// `critical`/`fatal` (mapped to `error`).
pub fn parse_log_level(raw: &str) -> ConfigResult<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "critical" | "fatal" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidValue {
            field: "global.log_level".to_string(),
            reason: format!("unknown log level '{}'", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SensorFamily;

    fn settings(yaml: &str) -> ConfigResult<ExporterSettings> {
        ConfigFile::from_yaml(yaml)?.into_settings()
    }

    #[test]
    fn empty_document_uses_defaults() {
        let settings = settings("").unwrap();
        assert_eq!(settings.listen_addr.port(), DEFAULT_LISTEN_PORT);
        assert!(settings.listen_addr.ip().is_unspecified());
        assert_eq!(settings.scrape_interval.as_secs(), 60);
        assert_eq!(settings.log_level, None);
        assert!(settings.registry.temperature.is_empty());
        assert!(!settings.registry.has_voltage());
        assert_eq!(settings.drivers, DriverSettings::default());
    }

    #[test]
    fn full_document() {
        let yaml = r#"
global:
  listen_address: 127.0.0.1
  listen_port: 9300
  scrape_interval: 2m
  log_level: WARNING
sensors:
  temperature:
    - sensor_id: 28-000
      name: engine_block
    - sensor_id: 28-001
      name: oil_sump
  voltage:
    - bus: 1
      name: aux
drivers:
  w1_devices_dir: /tmp/w1
  i2c_device: /dev/i2c-0
  ina3221_address: 65
"#;
        let settings = settings(yaml).unwrap();
        assert_eq!(settings.listen_addr, "127.0.0.1:9300".parse().unwrap());
        assert_eq!(settings.scrape_interval.as_secs(), 120);
        assert_eq!(settings.log_level, Some(Level::WARN));
        assert_eq!(settings.registry.temperature.len(), 2);
        assert_eq!(
            settings.registry.lookup(&SensorFamily::temperature("28-001")),
            Some("oil_sump")
        );
        let bus1 = VoltageBusIndex::new(1).unwrap();
        assert_eq!(settings.registry.display_name(&SensorFamily::voltage(bus1)), "aux");
        assert_eq!(settings.drivers.w1_devices_dir, PathBuf::from("/tmp/w1"));
        assert_eq!(settings.drivers.i2c_device, "/dev/i2c-0");
        assert_eq!(settings.drivers.ina3221_address, 65);
    }

    #[test]
    fn legacy_sensor_list() {
        let yaml = r#"
sensors:
  - sensor_id: 28-000
    name: engine_block
"#;
        let settings = settings(yaml).unwrap();
        assert_eq!(
            settings.registry.lookup(&SensorFamily::temperature("28-000")),
            Some("engine_block")
        );
    }

    #[test]
    fn null_sections_are_defaults() {
        let settings = settings("global:\nsensors:\n").unwrap();
        assert_eq!(settings.listen_addr.port(), DEFAULT_LISTEN_PORT);
        assert!(settings.registry.temperature.is_empty());
    }

    #[test]
    fn bus_out_of_range_is_fatal() {
        for bus in ["3", "-1", "42"] {
            let yaml = format!("sensors:\n  voltage:\n    - bus: {}\n      name: x\n", bus);
            assert!(matches!(
                settings(&yaml),
                Err(ConfigError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn bad_interval_is_rejected() {
        let err = settings("global:\n  scrape_interval: 10x\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { .. }));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = settings("global:\n  log_level: chatty\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_format_error() {
        let err = settings("global: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::FormatError(_)));
    }

    #[test]
    fn type_errors_name_the_offending_field() {
        let err = settings("sensors:\n  voltage:\n    - bus: one\n      name: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::FormatError(_)));
        let message = err.to_string();
        assert!(message.contains("voltage[0].bus"), "{}", message);

        let err = settings("sensors:\n  temperature:\n    - name: x\n").unwrap_err();
        assert!(err.to_string().contains("sensor_id"), "{}", err);

        let err = settings("sensors:\n  - sensor_id: [28]\n").unwrap_err();
        assert!(err.to_string().contains("sensor_id"), "{}", err);
    }

    #[test]
    fn scalar_sensors_section_is_rejected() {
        let err = settings("sensors: 42\n").unwrap_err();
        assert!(err.to_string().contains("map of sensor families"), "{}", err);
    }

    #[test]
    fn duplicate_entries_keep_the_last_name() {
        let yaml = r#"
sensors:
  temperature:
    - sensor_id: 28-000
      name: first
    - sensor_id: 28-000
      name: second
  voltage:
    - bus: 0
      name: main
    - bus: 0
      name: house
"#;
        let settings = settings(yaml).unwrap();
        assert_eq!(
            settings.registry.lookup(&SensorFamily::temperature("28-000")),
            Some("second")
        );
        let bus0 = VoltageBusIndex::new(0).unwrap();
        assert_eq!(settings.registry.display_name(&SensorFamily::voltage(bus0)), "house");
    }

    #[test]
    fn log_level_names() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("critical").unwrap(), Level::ERROR);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert!(parse_log_level("").is_err());
    }
}
