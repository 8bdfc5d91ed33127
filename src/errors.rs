use thiserror::Error;
use crate::bus::i2c::I2CError;

/// Errors raised while reading a sensor family or a single voltage bus
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C communication failed: {0}")]
    I2cError(#[from] I2CError),

    #[error("Sensor '{sensor}' is not ready")]
    NotReady { sensor: String },

    #[error("Sensor '{sensor}' read failed: {reason}")]
    ReadError { sensor: String, reason: String },

    #[error("Sensor '{sensor}' returned invalid data: {reason}")]
    DataError { sensor: String, reason: String },

    #[error("Bus '{bus}' not found or unavailable: {source}")]
    BusNotFound {
        bus: String,
        #[source]
        source: I2CError,
    },
}

/// Configuration-related errors. All of them abort startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file '{path}' has mode {mode:04o}, expected 0600 (-rw-------)")]
    PermissionError { path: String, mode: u32 },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] serde_yaml::Error),

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Metrics exposition errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to bind metrics listener on {addr}: {source}")]
    BindError {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Metrics server failed: {0}")]
    ServerError(#[source] std::io::Error),
}

/// Result type aliases for convenience
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
