use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::footprint::PassiveSize;

pub const DEFAULT_GROUND_NET: &str = "GND";

/// Per-design settings.
///
/// ```toml
/// default-passive-size = "0603"
/// ground-net = "GND"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DesignConfig {
    /// Footprint size given to resistors and capacitors added without one.
    pub default_passive_size: Option<PassiveSize>,
    pub ground_net: Option<String>,
}

impl DesignConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_default_passive_size(mut self, size: PassiveSize) -> Self {
        self.default_passive_size = Some(size);
        self
    }

    pub fn with_ground_net(mut self, name: impl Into<String>) -> Self {
        self.ground_net = Some(name.into());
        self
    }

    pub fn ground_net(&self) -> &str {
        self.ground_net.as_deref().unwrap_or(DEFAULT_GROUND_NET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchematicError;

    #[test]
    fn parses_kebab_case_toml() {
        let config = DesignConfig::from_toml_str(
            r#"
            default-passive-size = "0805"
            ground-net = "AGND"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_passive_size, Some(PassiveSize::S0805));
        assert_eq!(config.ground_net(), "AGND");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = DesignConfig::from_toml_str("").unwrap();
        assert_eq!(config, DesignConfig::default());
        assert_eq!(config.ground_net(), "GND");
    }

    #[test]
    fn bad_size_is_a_config_error() {
        let err = DesignConfig::from_toml_str(r#"default-passive-size = "0999""#).unwrap_err();
        assert!(matches!(err, SchematicError::Config(_)));
        assert!(DesignConfig::from_toml_str("unknown = 1").is_err());
    }
}
