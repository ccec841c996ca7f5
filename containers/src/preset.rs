use chain::{ChainConfig, PresetName};
use std::fmt::Debug;
use typenum::{
    Unsigned, U1048576, U1073741824, U1099511627776, U128, U16, U16777216, U2, U2048, U256, U32,
    U4, U4096, U512, U64, U65536, U8192,
};

/// Bounds every type-level length in a preset has to satisfy.
pub trait Length: Unsigned + Clone + Copy + Debug + PartialEq + Eq + Send + Sync + 'static {}

impl<T> Length for T where T: Unsigned + Clone + Copy + Debug + PartialEq + Eq + Send + Sync + 'static {}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: preset {preset} expects {expected}, config has {found}")]
pub struct PresetMismatch {
    pub preset: PresetName,
    pub field: &'static str,
    pub expected: String,
    pub found: String,
}

/// The collection bounds of a preset, lifted to the type level so the SSZ schemas
/// can be generic over them.
///
/// The runtime half of a preset lives in `chain::ChainConfig`; `check_config`
/// verifies the two agree before anything is decoded.
pub trait Preset: 'static + Default + Clone + Copy + Debug + PartialEq + Eq + Send + Sync {
    // --- state list lengths ---
    type SlotsPerHistoricalRoot: Length;
    type EpochsPerHistoricalVector: Length;
    type EpochsPerSlashingsVector: Length;
    type HistoricalRootsLimit: Length;
    type ValidatorRegistryLimit: Length;
    /// Must equal `EPOCHS_PER_ETH1_VOTING_PERIOD * SLOTS_PER_EPOCH`.
    type SlotsPerEth1VotingPeriod: Length;

    // --- max operations per block ---
    type MaxValidatorsPerCommittee: Length;
    type MaxProposerSlashings: Length;
    type MaxAttesterSlashings: Length;
    type MaxAttestations: Length;
    type MaxDeposits: Length;
    type MaxVoluntaryExits: Length;

    // --- altair ---
    type SyncCommitteeSize: Length;

    // --- bellatrix ---
    type BytesPerLogsBloom: Length;
    type MaxExtraDataBytes: Length;
    type MaxBytesPerTransaction: Length;
    type MaxTransactionsPerPayload: Length;

    // --- capella ---
    type MaxWithdrawalsPerPayload: Length;
    type MaxBlsToExecutionChanges: Length;

    // --- deneb ---
    type MaxBlobCommitmentsPerBlock: Length;

    const NAME: PresetName;

    fn default_config() -> ChainConfig {
        Self::NAME.config()
    }

    fn check_config(config: &ChainConfig) -> Result<(), PresetMismatch> {
        let mismatch = |field: &'static str, expected: String, found: String| PresetMismatch {
            preset: Self::NAME,
            field,
            expected,
            found,
        };

        if config.preset_base != Self::NAME {
            return Err(mismatch(
                "PRESET_BASE",
                Self::NAME.to_string(),
                config.preset_base.to_string(),
            ));
        }

        let lengths = [
            (
                "SLOTS_PER_HISTORICAL_ROOT",
                Self::SlotsPerHistoricalRoot::to_u64(),
                config.slots_per_historical_root,
            ),
            (
                "EPOCHS_PER_HISTORICAL_VECTOR",
                Self::EpochsPerHistoricalVector::to_u64(),
                config.epochs_per_historical_vector,
            ),
            (
                "EPOCHS_PER_SLASHINGS_VECTOR",
                Self::EpochsPerSlashingsVector::to_u64(),
                config.epochs_per_slashings_vector,
            ),
            (
                "HISTORICAL_ROOTS_LIMIT",
                Self::HistoricalRootsLimit::to_u64(),
                config.historical_roots_limit,
            ),
            (
                "VALIDATOR_REGISTRY_LIMIT",
                Self::ValidatorRegistryLimit::to_u64(),
                config.validator_registry_limit,
            ),
            (
                "EPOCHS_PER_ETH1_VOTING_PERIOD * SLOTS_PER_EPOCH",
                Self::SlotsPerEth1VotingPeriod::to_u64(),
                config
                    .epochs_per_eth1_voting_period
                    .saturating_mul(config.slots_per_epoch),
            ),
            (
                "SYNC_COMMITTEE_SIZE",
                Self::SyncCommitteeSize::to_u64(),
                config.sync_committee_size,
            ),
            (
                "MAX_WITHDRAWALS_PER_PAYLOAD",
                Self::MaxWithdrawalsPerPayload::to_u64(),
                config.max_withdrawals_per_payload,
            ),
            (
                "MAX_BLOB_COMMITMENTS_PER_BLOCK",
                Self::MaxBlobCommitmentsPerBlock::to_u64(),
                config.max_blob_commitments_per_block,
            ),
        ];

        for (field, expected, found) in lengths {
            if expected != found {
                return Err(mismatch(field, expected.to_string(), found.to_string()));
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinimalPreset;

impl Preset for MinimalPreset {
    type SlotsPerHistoricalRoot = U64;
    type EpochsPerHistoricalVector = U64;
    type EpochsPerSlashingsVector = U64;
    type HistoricalRootsLimit = U16777216;
    type ValidatorRegistryLimit = U1099511627776;
    type SlotsPerEth1VotingPeriod = U32;
    type MaxValidatorsPerCommittee = U2048;
    type MaxProposerSlashings = U16;
    type MaxAttesterSlashings = U2;
    type MaxAttestations = U128;
    type MaxDeposits = U16;
    type MaxVoluntaryExits = U16;
    type SyncCommitteeSize = U32;
    type BytesPerLogsBloom = U256;
    type MaxExtraDataBytes = U32;
    type MaxBytesPerTransaction = U1073741824;
    type MaxTransactionsPerPayload = U1048576;
    type MaxWithdrawalsPerPayload = U4;
    type MaxBlsToExecutionChanges = U16;
    type MaxBlobCommitmentsPerBlock = U32;

    const NAME: PresetName = PresetName::Minimal;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MainnetPreset;

impl Preset for MainnetPreset {
    type SlotsPerHistoricalRoot = U8192;
    type EpochsPerHistoricalVector = U65536;
    type EpochsPerSlashingsVector = U8192;
    type HistoricalRootsLimit = U16777216;
    type ValidatorRegistryLimit = U1099511627776;
    type SlotsPerEth1VotingPeriod = U2048;
    type MaxValidatorsPerCommittee = U2048;
    type MaxProposerSlashings = U16;
    type MaxAttesterSlashings = U2;
    type MaxAttestations = U128;
    type MaxDeposits = U16;
    type MaxVoluntaryExits = U16;
    type SyncCommitteeSize = U512;
    type BytesPerLogsBloom = U256;
    type MaxExtraDataBytes = U32;
    type MaxBytesPerTransaction = U1073741824;
    type MaxTransactionsPerPayload = U1048576;
    type MaxWithdrawalsPerPayload = U16;
    type MaxBlsToExecutionChanges = U16;
    type MaxBlobCommitmentsPerBlock = U4096;

    const NAME: PresetName = PresetName::Mainnet;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::{MAINNET_CONFIG, MINIMAL_CONFIG};

    #[test]
    fn built_in_configs_match_type_level_presets() {
        assert_eq!(MinimalPreset::check_config(&MINIMAL_CONFIG), Ok(()));
        assert_eq!(MainnetPreset::check_config(&MAINNET_CONFIG), Ok(()));
    }

    #[test]
    fn crossed_presets_are_rejected() {
        let err = MinimalPreset::check_config(&MAINNET_CONFIG).unwrap_err();
        assert_eq!(err.field, "PRESET_BASE");
    }

    #[test]
    fn length_disagreement_names_the_field() {
        let mut config = MINIMAL_CONFIG;
        config.slots_per_historical_root = 8192;
        let err = MinimalPreset::check_config(&config).unwrap_err();
        assert_eq!(err.field, "SLOTS_PER_HISTORICAL_ROOT");
        assert_eq!(err.expected, "64");
        assert_eq!(err.found, "8192");
    }

    #[test]
    fn eth1_voting_period_is_derived() {
        assert_eq!(
            <MinimalPreset as Preset>::SlotsPerEth1VotingPeriod::to_u64(),
            MINIMAL_CONFIG.epochs_per_eth1_voting_period * MINIMAL_CONFIG.slots_per_epoch
        );
        assert_eq!(
            <MainnetPreset as Preset>::SlotsPerEth1VotingPeriod::to_u64(),
            MAINNET_CONFIG.epochs_per_eth1_voting_period * MAINNET_CONFIG.slots_per_epoch
        );
    }
}
