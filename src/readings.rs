use crate::registry::SensorFamily;

/// One successful sample, ready to be published.
///
/// Readings are produced every cycle and overwrite the previous value for
/// the same key in the metric sink; they are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub family: SensorFamily,
    pub friendly_name: String,
    pub value: f64,
}

impl Reading {
    pub fn new(family: SensorFamily, friendly_name: impl Into<String>, value: f64) -> Self {
        Self {
            family,
            friendly_name: friendly_name.into(),
            value,
        }
    }
}
