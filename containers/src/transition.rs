use crate::{
    compute_shuffled_index, hash, BeaconBlockHeader, BeaconState, DomainType, Epoch, Hash256,
    Preset, Slot, ValidatorIndex, DOMAIN_BEACON_PROPOSER,
};
use chain::ChainConfig;
use tracing::trace;
use tree_hash::TreeHash;

const MAX_RANDOM_BYTE: u128 = u8::MAX as u128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockHeaderError {
    #[error("block slot {block_slot} does not match state slot {state_slot}")]
    StateSlotMismatch { state_slot: Slot, block_slot: Slot },
    #[error("block slot {block_slot} is not newer than latest header slot {latest_slot}")]
    OlderThanLatestBlockHeader { block_slot: Slot, latest_slot: Slot },
    #[error("block proposer {found} is not the expected proposer {expected}")]
    ProposerIndexMismatch {
        expected: ValidatorIndex,
        found: ValidatorIndex,
    },
    #[error("block parent root {found} does not match latest header root {expected}")]
    ParentBlockRootMismatch { expected: Hash256, found: Hash256 },
    #[error("proposer {0} is slashed")]
    ProposerSlashed(ValidatorIndex),
    #[error("validator {0} is not in the registry")]
    UnknownValidator(ValidatorIndex),
    #[error("no active validators at epoch {0}")]
    NoActiveValidators(Epoch),
    #[error("unable to shuffle {0} active validators")]
    ShuffleFailed(usize),
}

impl<E: Preset> BeaconState<E> {
    /// Validates `header` against this state and returns the post-state.
    ///
    /// `self` is never modified. On success the returned state differs from `self` only
    /// in `latest_block_header`, which holds the incoming header with a zero
    /// `state_root` until the next slot fills it.
    pub fn process_block_header(
        &self,
        header: &BeaconBlockHeader,
        config: &ChainConfig,
    ) -> Result<Self, BlockHeaderError> {
        if header.slot != self.slot() {
            return Err(BlockHeaderError::StateSlotMismatch {
                state_slot: self.slot(),
                block_slot: header.slot,
            });
        }

        let latest = self.latest_block_header();
        if header.slot <= latest.slot {
            return Err(BlockHeaderError::OlderThanLatestBlockHeader {
                block_slot: header.slot,
                latest_slot: latest.slot,
            });
        }

        let expected_proposer = self.get_beacon_proposer_index(config)?;
        if header.proposer_index != expected_proposer {
            return Err(BlockHeaderError::ProposerIndexMismatch {
                expected: expected_proposer,
                found: header.proposer_index,
            });
        }

        let parent_root = latest.tree_hash_root();
        if header.parent_root != parent_root {
            return Err(BlockHeaderError::ParentBlockRootMismatch {
                expected: parent_root,
                found: header.parent_root,
            });
        }

        let proposer = self
            .validators()
            .get(header.proposer_index as usize)
            .ok_or(BlockHeaderError::UnknownValidator(header.proposer_index))?;
        if proposer.slashed {
            return Err(BlockHeaderError::ProposerSlashed(header.proposer_index));
        }

        let mut post = self.clone();
        *post.latest_block_header_mut() = BeaconBlockHeader {
            slot: header.slot,
            proposer_index: header.proposer_index,
            parent_root: header.parent_root,
            state_root: Hash256::ZERO,
            body_root: header.body_root,
        };

        trace!(
            slot = header.slot,
            proposer = header.proposer_index,
            "Block header accepted"
        );

        Ok(post)
    }

    /// The proposer for the state's current slot.
    pub fn get_beacon_proposer_index(
        &self,
        config: &ChainConfig,
    ) -> Result<ValidatorIndex, BlockHeaderError> {
        let slot = self.slot();
        let epoch = config.compute_epoch_at_slot(slot);

        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(&self.get_seed(epoch, DOMAIN_BEACON_PROPOSER, config));
        preimage[32..].copy_from_slice(&slot.to_le_bytes());
        let seed = hash(&preimage);

        let indices = self.get_active_validator_indices(epoch);
        if indices.is_empty() {
            return Err(BlockHeaderError::NoActiveValidators(epoch));
        }

        self.compute_proposer_index(&indices, &seed, config)
    }

    /// `hash(domain_type ++ epoch ++ mix)` where `mix` is the randao mix
    /// `MIN_SEED_LOOKAHEAD + 1` epochs back, wrapping around the mix buffer.
    pub fn get_seed(&self, epoch: Epoch, domain_type: DomainType, config: &ChainConfig) -> [u8; 32] {
        let mixes = self.randao_mixes();
        let len = mixes.len() as u64;
        let lookback = (config.min_seed_lookahead + 1) % len;
        let mix = mixes[((epoch % len + len - lookback) % len) as usize];

        let mut preimage = [0u8; 44];
        preimage[..4].copy_from_slice(&domain_type);
        preimage[4..12].copy_from_slice(&epoch.to_le_bytes());
        preimage[12..].copy_from_slice(mix.as_slice());
        hash(&preimage)
    }

    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<ValidatorIndex> {
        self.validators()
            .iter()
            .enumerate()
            .filter(|(_, validator)| validator.is_active_at(epoch))
            .map(|(index, _)| index as ValidatorIndex)
            .collect()
    }

    /// Samples candidates from the shuffled `indices` until one passes the
    /// effective-balance filter. Does not return if every candidate has a zero
    /// effective balance.
    pub fn compute_proposer_index(
        &self,
        indices: &[ValidatorIndex],
        seed: &[u8; 32],
        config: &ChainConfig,
    ) -> Result<ValidatorIndex, BlockHeaderError> {
        let total = indices.len() as u64;
        let shuffle_failed = || BlockHeaderError::ShuffleFailed(indices.len());
        if total == 0 {
            return Err(shuffle_failed());
        }

        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(seed);

        let mut i: u64 = 0;
        loop {
            let shuffled = compute_shuffled_index(i % total, total, seed, config.shuffle_round_count)
                .ok_or_else(shuffle_failed)?;
            let candidate = indices[shuffled as usize];

            preimage[32..].copy_from_slice(&(i / 32).to_le_bytes());
            let random_byte = hash(&preimage)[(i % 32) as usize];

            let effective_balance = self
                .validators()
                .get(candidate as usize)
                .ok_or(BlockHeaderError::UnknownValidator(candidate))?
                .effective_balance;

            if u128::from(effective_balance) * MAX_RANDOM_BYTE
                >= u128::from(config.max_effective_balance) * u128::from(random_byte)
            {
                return Ok(candidate);
            }

            i = i.checked_add(1).ok_or_else(shuffle_failed)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MainnetPreset, MinimalPreset};
    use chain::{ForkName, MAINNET_CONFIG, MINIMAL_CONFIG};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn state_at_slot_one(fork: ForkName) -> BeaconState<MinimalPreset> {
        let mut state = BeaconState::generate_genesis(fork, &MINIMAL_CONFIG, 64, 0);
        state.advance_slot();
        state
    }

    fn valid_header(state: &BeaconState<MinimalPreset>) -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: state.slot(),
            proposer_index: state.get_beacon_proposer_index(&MINIMAL_CONFIG).unwrap(),
            parent_root: state.latest_block_header().tree_hash_root(),
            state_root: Hash256::repeat_byte(0xaa),
            body_root: Hash256::repeat_byte(0xbb),
        }
    }

    #[rstest]
    #[case(ForkName::Bellatrix)]
    #[case(ForkName::Capella)]
    #[case(ForkName::Deneb)]
    fn test_valid_header_replaces_latest_header(#[case] fork: ForkName) {
        let pre = state_at_slot_one(fork);
        let header = valid_header(&pre);

        let post = pre.process_block_header(&header, &MINIMAL_CONFIG).unwrap();

        assert_eq!(
            *post.latest_block_header(),
            BeaconBlockHeader {
                state_root: Hash256::ZERO,
                ..header
            }
        );

        let mut expected = pre.clone();
        *expected.latest_block_header_mut() = *post.latest_block_header();
        assert_eq!(post, expected);
    }

    #[test]
    fn test_pre_state_is_untouched() {
        let pre = state_at_slot_one(ForkName::Capella);
        let snapshot = pre.clone();
        let _ = pre.process_block_header(&valid_header(&pre), &MINIMAL_CONFIG);
        assert_eq!(pre, snapshot);
    }

    #[test]
    fn test_slot_mismatch() {
        let pre = state_at_slot_one(ForkName::Capella);
        let header = BeaconBlockHeader {
            slot: 2,
            ..valid_header(&pre)
        };
        assert_eq!(
            pre.process_block_header(&header, &MINIMAL_CONFIG),
            Err(BlockHeaderError::StateSlotMismatch {
                state_slot: 1,
                block_slot: 2
            })
        );
    }

    #[test]
    fn test_header_not_newer_than_latest() {
        let pre = BeaconState::<MinimalPreset>::generate_genesis(
            ForkName::Capella,
            &MINIMAL_CONFIG,
            64,
            0,
        );
        let header = valid_header(&pre);
        assert_eq!(
            pre.process_block_header(&header, &MINIMAL_CONFIG),
            Err(BlockHeaderError::OlderThanLatestBlockHeader {
                block_slot: 0,
                latest_slot: 0
            })
        );
    }

    #[test]
    fn test_wrong_proposer() {
        let pre = state_at_slot_one(ForkName::Capella);
        let valid = valid_header(&pre);
        let header = BeaconBlockHeader {
            proposer_index: (valid.proposer_index + 1) % 64,
            ..valid
        };
        assert!(matches!(
            pre.process_block_header(&header, &MINIMAL_CONFIG),
            Err(BlockHeaderError::ProposerIndexMismatch { .. })
        ));
    }

    #[test]
    fn test_parent_root_mismatch() {
        let pre = state_at_slot_one(ForkName::Capella);
        let header = BeaconBlockHeader {
            parent_root: Hash256::repeat_byte(0x11),
            ..valid_header(&pre)
        };
        assert!(matches!(
            pre.process_block_header(&header, &MINIMAL_CONFIG),
            Err(BlockHeaderError::ParentBlockRootMismatch { .. })
        ));
    }

    #[test]
    fn test_slashed_proposer() {
        let mut pre = state_at_slot_one(ForkName::Capella);
        let header = valid_header(&pre);
        pre.validators_mut()[header.proposer_index as usize].slashed = true;

        assert_eq!(
            pre.process_block_header(&header, &MINIMAL_CONFIG),
            Err(BlockHeaderError::ProposerSlashed(header.proposer_index))
        );
    }

    #[test]
    fn test_no_active_validators() {
        let mut pre = state_at_slot_one(ForkName::Capella);
        for validator in pre.validators_mut().iter_mut() {
            validator.exit_epoch = 0;
        }
        assert_eq!(
            pre.get_beacon_proposer_index(&MINIMAL_CONFIG),
            Err(BlockHeaderError::NoActiveValidators(0))
        );
    }

    fn proposer_seed(state: &BeaconState<MinimalPreset>) -> [u8; 32] {
        let epoch = MINIMAL_CONFIG.compute_epoch_at_slot(state.slot());
        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(&state.get_seed(epoch, DOMAIN_BEACON_PROPOSER, &MINIMAL_CONFIG));
        preimage[32..].copy_from_slice(&state.slot().to_le_bytes());
        hash(&preimage)
    }

    #[test]
    fn test_full_balances_take_first_candidate() {
        let pre = state_at_slot_one(ForkName::Deneb);
        let seed = proposer_seed(&pre);
        let first = compute_shuffled_index(0, 64, &seed, MINIMAL_CONFIG.shuffle_round_count).unwrap();

        assert_eq!(pre.get_beacon_proposer_index(&MINIMAL_CONFIG), Ok(first));
    }

    #[test]
    fn test_zero_balance_candidate_needs_zero_random_byte() {
        let mut pre = state_at_slot_one(ForkName::Capella);
        let favourite = pre.get_beacon_proposer_index(&MINIMAL_CONFIG).unwrap();
        pre.validators_mut()[favourite as usize].effective_balance = 0;

        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(&proposer_seed(&pre));
        let first_random_byte = hash(&preimage)[0];

        let proposer = pre.get_beacon_proposer_index(&MINIMAL_CONFIG).unwrap();
        assert_eq!(proposer == favourite, first_random_byte == 0);
    }

    #[test]
    fn test_seed_reads_mix_behind_lookahead() {
        let mut state = BeaconState::<MainnetPreset>::generate_genesis(
            ForkName::Capella,
            &MAINNET_CONFIG,
            4,
            0,
        );
        let before = state.get_seed(0, DOMAIN_BEACON_PROPOSER, &MAINNET_CONFIG);

        // epoch 0 wraps around to the second-to-last mix
        let index = state.randao_mixes().len() - 2;
        state.randao_mixes_mut()[index] = Hash256::repeat_byte(0x99);

        assert_ne!(state.get_seed(0, DOMAIN_BEACON_PROPOSER, &MAINNET_CONFIG), before);
    }
}
