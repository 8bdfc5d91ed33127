#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;

/// I2C bus error type - platform specific
#[cfg(target_os = "linux")]
pub type I2CError = LinuxI2CError;

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(target_os = "linux"))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(target_os = "linux"))]
impl std::error::Error for I2CError {}

/// A single slave device on an I2C bus
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
    path: String,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    path: String,
}

#[cfg(target_os = "linux")]
impl I2CBus {
    pub fn new(path: &str, address: u8) -> Result<Self, I2CError> {
        let device = LinuxI2CDevice::new(path, address as u16)?;
        Ok(Self { device, path: path.to_string() })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads a 16-bit register transmitted MSB first
    pub fn read_u16_be(&mut self, reg: u8) -> Result<u16, I2CError> {
        // SMBus words are little-endian on the wire
        Ok(self.device.smbus_read_word_data(reg)?.swap_bytes())
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn new(path: &str, _address: u8) -> Result<Self, I2CError> {
        Err(I2CError(format!("I2C is only supported on Linux (requested {})", path)))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn read_u16_be(&mut self, _reg: u8) -> Result<u16, I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }
}
