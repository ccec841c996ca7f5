use crate::{ChainConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The protocol upgrades whose block-header fixtures this workspace can decode.
///
/// Ordering follows activation order, so `ForkName::Capella > ForkName::Bellatrix`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Bellatrix,
    Capella,
    Deneb,
}

impl ForkName {
    pub fn list_all() -> Vec<ForkName> {
        vec![ForkName::Bellatrix, ForkName::Capella, ForkName::Deneb]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ForkName::Bellatrix => "bellatrix",
            ForkName::Capella => "capella",
            ForkName::Deneb => "deneb",
        }
    }

    /// Version stored in `state.fork.current_version` while this fork is active.
    pub fn fork_version(self, config: &ChainConfig) -> [u8; 4] {
        match self {
            ForkName::Bellatrix => config.bellatrix_fork_version,
            ForkName::Capella => config.capella_fork_version,
            ForkName::Deneb => config.deneb_fork_version,
        }
    }

    /// Version stored in `state.fork.previous_version` while this fork is active.
    pub fn previous_fork_version(self, config: &ChainConfig) -> [u8; 4] {
        match self {
            ForkName::Bellatrix => config.altair_fork_version,
            ForkName::Capella => config.bellatrix_fork_version,
            ForkName::Deneb => config.capella_fork_version,
        }
    }

    /// Resolves a fork from the version found in a decoded state.
    pub fn from_fork_version(version: [u8; 4], config: &ChainConfig) -> Option<ForkName> {
        Self::list_all()
            .into_iter()
            .find(|fork| fork.fork_version(config) == version)
    }
}

impl FromStr for ForkName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bellatrix" | "merge" => Ok(ForkName::Bellatrix),
            "capella" => Ok(ForkName::Capella),
            "deneb" => Ok(ForkName::Deneb),
            other => Err(ConfigError::UnknownFork(other.to_string())),
        }
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAINNET_CONFIG, MINIMAL_CONFIG};
    use rstest::rstest;

    #[rstest]
    #[case("bellatrix", Some(ForkName::Bellatrix))]
    #[case("merge", Some(ForkName::Bellatrix))]
    #[case("Capella", Some(ForkName::Capella))]
    #[case("deneb", Some(ForkName::Deneb))]
    #[case("electra", None)]
    fn parses_fork_names(#[case] name: &str, #[case] expected: Option<ForkName>) {
        assert_eq!(name.parse::<ForkName>().ok(), expected);
    }

    #[test]
    fn fork_names_round_trip() {
        for fork in ForkName::list_all() {
            assert_eq!(fork.to_string().parse::<ForkName>().unwrap(), fork);
        }
    }

    #[rstest]
    #[case(ForkName::Bellatrix, &MINIMAL_CONFIG, [0x02, 0x00, 0x00, 0x01])]
    #[case(ForkName::Capella, &MINIMAL_CONFIG, [0x03, 0x00, 0x00, 0x01])]
    #[case(ForkName::Capella, &MAINNET_CONFIG, [0x03, 0x00, 0x00, 0x00])]
    #[case(ForkName::Deneb, &MAINNET_CONFIG, [0x04, 0x00, 0x00, 0x00])]
    fn versions_differ_between_presets(
        #[case] fork: ForkName,
        #[case] config: &ChainConfig,
        #[case] version: [u8; 4],
    ) {
        assert_eq!(fork.fork_version(config), version);
    }

    #[test]
    fn resolves_fork_from_version() {
        let version = ForkName::Deneb.fork_version(&MINIMAL_CONFIG);
        assert_eq!(
            ForkName::from_fork_version(version, &MINIMAL_CONFIG),
            Some(ForkName::Deneb)
        );
        assert_eq!(ForkName::from_fork_version([9, 9, 9, 9], &MINIMAL_CONFIG), None);
    }

    #[test]
    fn previous_version_chains_to_prior_fork() {
        assert_eq!(
            ForkName::Capella.previous_fork_version(&MINIMAL_CONFIG),
            ForkName::Bellatrix.fork_version(&MINIMAL_CONFIG)
        );
    }
}
