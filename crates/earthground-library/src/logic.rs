use anyhow::{bail, Result};

/// Maps logic levels to the nets that drive them, e.g. strapping pins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectricalBool {
    high: String,
    low: String,
}

impl Default for ElectricalBool {
    fn default() -> Self {
        Self::new("VCC", "GND")
    }
}

impl ElectricalBool {
    pub fn new(high: impl Into<String>, low: impl Into<String>) -> Self {
        Self {
            high: high.into(),
            low: low.into(),
        }
    }

    pub fn to_net(&self, value: bool) -> &str {
        if value {
            &self.high
        } else {
            &self.low
        }
    }

    pub fn to_bool(&self, net: &str) -> Result<bool> {
        if net == self.high {
            Ok(true)
        } else if net == self.low {
            Ok(false)
        } else {
            bail!("Undefined value for net: {net}")
        }
    }
}
