use crate::PresetName;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;
pub const MAX_EFFECTIVE_BALANCE: u64 = 32_000_000_000;
pub const MIN_SEED_LOOKAHEAD: u64 = 1;
pub const HISTORICAL_ROOTS_LIMIT: u64 = 1u64 << 24;
pub const VALIDATOR_REGISTRY_LIMIT: u64 = 1u64 << 40;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("unknown fork: {0}")]
    UnknownFork(String),
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid preset yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0} does not contain a yaml mapping")]
    NotAMapping(PathBuf),
    #[error("no PRESET_BASE given in any of the config files")]
    MissingPresetBase,
    #[error("no preset is active")]
    NoActivePreset,
}

/// The runtime constant bundle shared by the fixture loader and the state transition.
///
/// Keys follow the consensus-spec YAML names, so a bundle can be read straight from
/// the `presets/<name>/*.yaml` and `configs/<name>.yaml` files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ChainConfig {
    pub preset_base: PresetName,

    // --- time parameters ---
    pub slots_per_epoch: u64,
    pub min_seed_lookahead: u64,
    pub shuffle_round_count: u8,

    // --- gwei values ---
    pub max_effective_balance: u64,

    // --- state list lengths ---
    pub slots_per_historical_root: u64,
    pub epochs_per_historical_vector: u64,
    pub epochs_per_slashings_vector: u64,
    pub historical_roots_limit: u64,
    pub validator_registry_limit: u64,
    pub epochs_per_eth1_voting_period: u64,
    pub sync_committee_size: u64,
    pub max_withdrawals_per_payload: u64,
    pub max_blob_commitments_per_block: u64,

    // --- fork versions ---
    #[serde(with = "fork_version")]
    pub genesis_fork_version: [u8; 4],
    #[serde(with = "fork_version")]
    pub altair_fork_version: [u8; 4],
    #[serde(with = "fork_version")]
    pub bellatrix_fork_version: [u8; 4],
    #[serde(with = "fork_version")]
    pub capella_fork_version: [u8; 4],
    #[serde(with = "fork_version")]
    pub deneb_fork_version: [u8; 4],
}

pub const MINIMAL_CONFIG: ChainConfig = ChainConfig {
    preset_base: PresetName::Minimal,
    slots_per_epoch: 8,
    min_seed_lookahead: MIN_SEED_LOOKAHEAD,
    shuffle_round_count: 10,
    max_effective_balance: MAX_EFFECTIVE_BALANCE,
    slots_per_historical_root: 64,
    epochs_per_historical_vector: 64,
    epochs_per_slashings_vector: 64,
    historical_roots_limit: HISTORICAL_ROOTS_LIMIT,
    validator_registry_limit: VALIDATOR_REGISTRY_LIMIT,
    epochs_per_eth1_voting_period: 4,
    sync_committee_size: 32,
    max_withdrawals_per_payload: 4,
    max_blob_commitments_per_block: 32,
    genesis_fork_version: [0x00, 0x00, 0x00, 0x01],
    altair_fork_version: [0x01, 0x00, 0x00, 0x01],
    bellatrix_fork_version: [0x02, 0x00, 0x00, 0x01],
    capella_fork_version: [0x03, 0x00, 0x00, 0x01],
    deneb_fork_version: [0x04, 0x00, 0x00, 0x01],
};

pub const MAINNET_CONFIG: ChainConfig = ChainConfig {
    preset_base: PresetName::Mainnet,
    slots_per_epoch: 32,
    min_seed_lookahead: MIN_SEED_LOOKAHEAD,
    shuffle_round_count: 90,
    max_effective_balance: MAX_EFFECTIVE_BALANCE,
    slots_per_historical_root: 8192,
    epochs_per_historical_vector: 65536,
    epochs_per_slashings_vector: 8192,
    historical_roots_limit: HISTORICAL_ROOTS_LIMIT,
    validator_registry_limit: VALIDATOR_REGISTRY_LIMIT,
    epochs_per_eth1_voting_period: 64,
    sync_committee_size: 512,
    max_withdrawals_per_payload: 16,
    max_blob_commitments_per_block: 4096,
    genesis_fork_version: [0x00, 0x00, 0x00, 0x00],
    altair_fork_version: [0x01, 0x00, 0x00, 0x00],
    bellatrix_fork_version: [0x02, 0x00, 0x00, 0x00],
    capella_fork_version: [0x03, 0x00, 0x00, 0x00],
    deneb_fork_version: [0x04, 0x00, 0x00, 0x00],
};

impl ChainConfig {
    pub fn compute_epoch_at_slot(&self, slot: u64) -> u64 {
        slot / self.slots_per_epoch
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_from_files(&[path])
    }

    /// Reads one or more YAML files and overlays their keys on the built-in bundle
    /// named by `PRESET_BASE`. Later files win; keys this bundle doesn't know are ignored.
    pub fn load_from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut overlay = Mapping::new();
        for path in paths {
            let path = path.as_ref();
            let file = File::open(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            match serde_yaml::from_reader(BufReader::new(file))? {
                Value::Mapping(mapping) => {
                    for (key, value) in mapping {
                        overlay.insert(key, value);
                    }
                }
                Value::Null => {}
                _ => return Err(ConfigError::NotAMapping(path.to_path_buf())),
            }
        }

        let preset_base: PresetName = match overlay.get("PRESET_BASE") {
            Some(value) => serde_yaml::from_value(value.clone())?,
            None => return Err(ConfigError::MissingPresetBase),
        };

        let Value::Mapping(mut merged) = serde_yaml::to_value(preset_base.config())? else {
            return Err(ConfigError::MissingPresetBase);
        };
        for (key, value) in overlay {
            merged.insert(key, value);
        }

        Ok(serde_yaml::from_value(Value::Mapping(merged))?)
    }
}

/// Fork versions are written as `0x`-prefixed hex; YAML 1.2 readers may also hand
/// them over as plain integers.
mod fork_version {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVersion {
        Int(u32),
        Hex(String),
    }

    pub fn serialize<S: Serializer>(version: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(version)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 4], D::Error> {
        match RawVersion::deserialize(deserializer)? {
            RawVersion::Int(value) => Ok(value.to_be_bytes()),
            RawVersion::Hex(text) => {
                let digits = text.strip_prefix("0x").unwrap_or(&text);
                let mut version = [0u8; 4];
                hex::decode_to_slice(digits, &mut version).map_err(D::Error::custom)?;
                Ok(version)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_yaml(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn epoch_math() {
        assert_eq!(MINIMAL_CONFIG.compute_epoch_at_slot(64), 8);
        assert_eq!(MAINNET_CONFIG.compute_epoch_at_slot(64), 2);
    }

    #[test]
    fn yaml_round_trip_keeps_bundle() {
        let yaml = serde_yaml::to_string(&MINIMAL_CONFIG).unwrap();
        assert!(yaml.contains("0x03000001"));
        let decoded: ChainConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, MINIMAL_CONFIG);
    }

    #[test]
    fn overlays_files_on_preset_base() {
        let dir = tempfile::tempdir().unwrap();
        let preset = write_yaml(&dir, "phase0.yaml", "SHUFFLE_ROUND_COUNT: 12\nMAX_COMMITTEES_PER_SLOT: 4\n");
        let config = write_yaml(
            &dir,
            "config.yaml",
            "PRESET_BASE: 'minimal'\nCAPELLA_FORK_VERSION: 0x03000007\n",
        );

        let loaded = ChainConfig::load_from_files(&[preset, config]).unwrap();

        assert_eq!(loaded.shuffle_round_count, 12);
        assert_eq!(loaded.capella_fork_version, [0x03, 0x00, 0x00, 0x07]);
        assert_eq!(loaded.slots_per_epoch, MINIMAL_CONFIG.slots_per_epoch);
    }

    #[test]
    fn later_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_yaml(&dir, "a.yaml", "PRESET_BASE: mainnet\nSLOTS_PER_EPOCH: 16\n");
        let second = write_yaml(&dir, "b.yaml", "SLOTS_PER_EPOCH: 4\n");

        let loaded = ChainConfig::load_from_files(&[first, second]).unwrap();

        assert_eq!(loaded.preset_base, PresetName::Mainnet);
        assert_eq!(loaded.slots_per_epoch, 4);
    }

    #[test]
    fn missing_preset_base_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "config.yaml", "SLOTS_PER_EPOCH: 4\n");
        assert!(matches!(
            ChainConfig::load_from_file(path),
            Err(ConfigError::MissingPresetBase)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ChainConfig::load_from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
