use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Number of addressable voltage buses on the monitor.
pub const VOLTAGE_BUS_COUNT: usize = 3;

/// Index of one voltage bus, always within `0..VOLTAGE_BUS_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoltageBusIndex(u8);

impl VoltageBusIndex {
    pub const ALL: [VoltageBusIndex; VOLTAGE_BUS_COUNT] =
        [VoltageBusIndex(0), VoltageBusIndex(1), VoltageBusIndex(2)];

    /// Returns `None` when `index` is outside the hardware range.
    pub fn new(index: i64) -> Option<Self> {
        if (0..VOLTAGE_BUS_COUNT as i64).contains(&index) {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Label value identifying the bus, e.g. `voltage_bus_1`.
    pub fn bus_name(&self) -> String {
        format!("voltage_bus_{}", self.0)
    }
}

impl fmt::Display for VoltageBusIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical identity of a sensor within its family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    Temperature { id: String },
    VoltageBus { index: VoltageBusIndex },
}

impl SensorFamily {
    pub fn temperature(id: impl Into<String>) -> Self {
        SensorFamily::Temperature { id: id.into() }
    }

    pub fn voltage(index: VoltageBusIndex) -> Self {
        SensorFamily::VoltageBus { index }
    }

    /// Value of the identity label (`sensor_id` or `voltage_bus`).
    pub fn key_label(&self) -> String {
        match self {
            SensorFamily::Temperature { id } => id.clone(),
            SensorFamily::VoltageBus { index } => index.bus_name(),
        }
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorFamily::Temperature { id } => write!(f, "temperature:{}", id),
            SensorFamily::VoltageBus { index } => write!(f, "voltage:{}", index),
        }
    }
}

/// Friendly names for one sensor family, keyed by hardware identity.
#[derive(Debug, Clone)]
pub struct FriendlyNameRegistry<K> {
    names: HashMap<K, String>,
}

impl<K: Eq + Hash> FriendlyNameRegistry<K> {
    pub fn new() -> Self {
        Self { names: HashMap::new() }
    }

    /// Returns the previous name when the key was already registered.
    pub fn insert(&mut self, key: K, name: String) -> Option<String> {
        self.names.insert(key, name)
    }

    pub fn get(&self, key: &K) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Eq + Hash> Default for FriendlyNameRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Friendly names for every sensor family. Built once at startup and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    pub temperature: FriendlyNameRegistry<String>,
    pub voltage: FriendlyNameRegistry<VoltageBusIndex>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any voltage bus is named in the configuration.
    pub fn has_voltage(&self) -> bool {
        !self.voltage.is_empty()
    }

    /// The configured name, if any. A miss is not an error.
    pub fn lookup(&self, family: &SensorFamily) -> Option<&str> {
        match family {
            SensorFamily::Temperature { id } => self.temperature.get(id),
            SensorFamily::VoltageBus { index } => self.voltage.get(index),
        }
    }

    /// Name to publish for `family`.
    ///
    /// Unnamed temperature sensors publish an empty name; voltage buses
    /// without a (non-empty) name fall back to `voltage_bus_<index>`.
    pub fn display_name(&self, family: &SensorFamily) -> String {
        match family {
            SensorFamily::Temperature { id } => {
                self.temperature.get(id).unwrap_or_default().to_string()
            }
            SensorFamily::VoltageBus { index } => match self.voltage.get(index) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => index.bus_name(),
            },
        }
    }
}
