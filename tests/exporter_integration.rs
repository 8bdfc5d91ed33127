//! Config file to rendered exposition, with fake sensor drivers.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;

use ursus_exporter::sensors::{TemperatureDriver, TemperatureSample, VoltageMonitor};
use ursus_exporter::{
    load_exporter_config, ConfigError, PrometheusSink, ScrapeLoop, SensorError, SensorResult,
    VoltageBusIndex,
};

struct StaticThermometers(Vec<TemperatureSample>);

#[async_trait]
impl TemperatureDriver for StaticThermometers {
    async fn enumerate(&self) -> SensorResult<Vec<TemperatureSample>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

struct UnreadyThermometers;

#[async_trait]
impl TemperatureDriver for UnreadyThermometers {
    async fn enumerate(&self) -> SensorResult<Vec<TemperatureSample>> {
        Err(SensorError::NotReady { sensor: "28-000".to_string() })
    }

    fn name(&self) -> &str {
        "unready"
    }
}

struct StaticBuses([f64; 3]);

#[async_trait]
impl VoltageMonitor for StaticBuses {
    async fn read_voltage(&self, bus: VoltageBusIndex) -> SensorResult<f64> {
        Ok(self.0[bus.get() as usize])
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(unix)]
fn write_config(content: &str, mode: u32) -> tempfile::NamedTempFile {
    use std::os::unix::fs::PermissionsExt;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(mode)).unwrap();
    file
}

#[cfg(unix)]
#[tokio::test]
async fn temperature_sensor_end_to_end() {
    let file = write_config(
        r#"
global:
  scrape_interval: "2m"
sensors:
  temperature:
    - sensor_id: "28-000"
      name: engine_block
"#,
        0o600,
    );
    let settings = load_exporter_config(file.path()).unwrap();
    assert_eq!(settings.scrape_interval.as_secs(), 120);

    let sink = Arc::new(PrometheusSink::new());
    let scrape = ScrapeLoop::new(settings.registry, sink.clone())
        .with_temperature(Box::new(StaticThermometers(vec![TemperatureSample::new("28-000", 87.5)])));
    scrape.scrape_once().await;

    let body = sink.render().unwrap();
    assert!(
        body.contains(r#"ursus_temperature{sensor_id="28-000",friendly_name="engine_block"} 87.5"#),
        "{}",
        body
    );
}

#[cfg(unix)]
#[tokio::test]
async fn voltage_buses_end_to_end() {
    let file = write_config(
        r#"
sensors:
  voltage:
    - bus: 1
      name: aux
"#,
        0o600,
    );
    let settings = load_exporter_config(file.path()).unwrap();
    assert!(settings.registry.has_voltage());

    let sink = Arc::new(PrometheusSink::new());
    let scrape = ScrapeLoop::new(settings.registry, sink.clone())
        .with_temperature(Box::new(UnreadyThermometers))
        .with_voltage(Box::new(StaticBuses([5.0, 12.3, 3.3])));
    let report = scrape.scrape_once().await;
    assert!(report.temperature_failed);
    assert_eq!(report.published, 3);

    let body = sink.render().unwrap();
    for expected in [
        r#"ursus_voltage{voltage_bus="voltage_bus_1",friendly_name="aux"} 12.3"#,
        r#"ursus_voltage{voltage_bus="voltage_bus_0",friendly_name="voltage_bus_0"} 5.0"#,
        r#"ursus_voltage{voltage_bus="voltage_bus_2",friendly_name="voltage_bus_2"} 3.3"#,
    ] {
        assert!(body.contains(expected), "missing {} in\n{}", expected, body);
    }
    assert!(!body.contains("ursus_temperature{"));
}

#[cfg(unix)]
#[test]
fn world_readable_config_is_rejected() {
    let file = write_config("sensors:\n  voltage:\n    - bus: 1\n      name: aux\n", 0o644);
    assert!(matches!(
        load_exporter_config(file.path()),
        Err(ConfigError::PermissionError { .. })
    ));
}

#[cfg(unix)]
#[test]
fn out_of_range_bus_is_rejected() {
    let file = write_config("sensors:\n  voltage:\n    - bus: 3\n      name: aux\n", 0o600);
    assert!(matches!(
        load_exporter_config(file.path()),
        Err(ConfigError::InvalidValue { .. })
    ));
}
