use crate::config::{ChainConfig, MAINNET_CONFIG, MINIMAL_CONFIG};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINIMAL: &str = "minimal";
const MAINNET: &str = "mainnet";

/// Names one of the built-in protocol constant bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Minimal,
    Mainnet,
}

impl PresetName {
    pub fn list_all() -> Vec<PresetName> {
        vec![PresetName::Minimal, PresetName::Mainnet]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Minimal => MINIMAL,
            PresetName::Mainnet => MAINNET,
        }
    }

    /// The built-in constant bundle for this preset.
    pub fn config(self) -> ChainConfig {
        match self {
            PresetName::Minimal => MINIMAL_CONFIG,
            PresetName::Mainnet => MAINNET_CONFIG,
        }
    }
}

impl FromStr for PresetName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MINIMAL => Ok(PresetName::Minimal),
            MAINNET => Ok(PresetName::Mainnet),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("minimal", Some(PresetName::Minimal))]
    #[case("mainnet", Some(PresetName::Mainnet))]
    #[case("gnosis", None)]
    fn parses_known_names(#[case] name: &str, #[case] expected: Option<PresetName>) {
        assert_eq!(name.parse::<PresetName>().ok(), expected);
    }

    #[test]
    fn display_round_trips() {
        for preset in PresetName::list_all() {
            assert_eq!(preset.to_string().parse::<PresetName>().unwrap(), preset);
        }
    }

    #[test]
    fn config_carries_its_own_name() {
        for preset in PresetName::list_all() {
            assert_eq!(preset.config().preset_base, preset);
        }
    }
}
