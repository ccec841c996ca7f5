use crate::{
    BeaconBlockBodyBellatrix, BeaconBlockBodyCapella, BeaconBlockBodyDeneb, BeaconBlockHeader,
    BlsPubkey, Checkpoint, Eth1Data, ExecutionPayloadHeaderBellatrix,
    ExecutionPayloadHeaderCapella, ExecutionPayloadHeaderDeneb, Fork, Gwei, Hash256,
    HistoricalSummary, ParticipationFlags, Preset, Slot, SyncCommittee, Validator,
};
use chain::{config::FAR_FUTURE_EPOCH, ChainConfig, ForkName};
use ssz::{Decode, DecodeError, Encode};
use ssz_derive::{Decode, Encode};
use ssz_types::{BitVector, FixedVector, VariableList};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;
use typenum::{Unsigned, U4};

pub type Validators<E> = VariableList<Validator, <E as Preset>::ValidatorRegistryLimit>;
pub type Balances<E> = VariableList<Gwei, <E as Preset>::ValidatorRegistryLimit>;
pub type RandaoMixes<E> = FixedVector<Hash256, <E as Preset>::EpochsPerHistoricalVector>;

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconStateBellatrix<E: Preset> {
    // --- versioning ---
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // --- history ---
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, E::HistoricalRootsLimit>,

    // --- eth1 ---
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
    pub eth1_deposit_index: u64,

    // --- registry ---
    pub validators: Validators<E>,
    pub balances: Balances<E>,

    // --- randomness ---
    pub randao_mixes: RandaoMixes<E>,

    // --- slashings ---
    pub slashings: FixedVector<Gwei, E::EpochsPerSlashingsVector>,

    // --- participation ---
    pub previous_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,
    pub current_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,

    // --- finality ---
    pub justification_bits: BitVector<U4>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // --- inactivity ---
    pub inactivity_scores: VariableList<u64, E::ValidatorRegistryLimit>,

    // --- sync ---
    pub current_sync_committee: SyncCommittee<E>,
    pub next_sync_committee: SyncCommittee<E>,

    // --- execution ---
    pub latest_execution_payload_header: ExecutionPayloadHeaderBellatrix<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconStateCapella<E: Preset> {
    // --- versioning ---
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // --- history ---
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, E::HistoricalRootsLimit>,

    // --- eth1 ---
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
    pub eth1_deposit_index: u64,

    // --- registry ---
    pub validators: Validators<E>,
    pub balances: Balances<E>,

    // --- randomness ---
    pub randao_mixes: RandaoMixes<E>,

    // --- slashings ---
    pub slashings: FixedVector<Gwei, E::EpochsPerSlashingsVector>,

    // --- participation ---
    pub previous_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,
    pub current_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,

    // --- finality ---
    pub justification_bits: BitVector<U4>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // --- inactivity ---
    pub inactivity_scores: VariableList<u64, E::ValidatorRegistryLimit>,

    // --- sync ---
    pub current_sync_committee: SyncCommittee<E>,
    pub next_sync_committee: SyncCommittee<E>,

    // --- execution ---
    pub latest_execution_payload_header: ExecutionPayloadHeaderCapella<E>,

    // --- withdrawals ---
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,

    pub historical_summaries: VariableList<HistoricalSummary, E::HistoricalRootsLimit>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconStateDeneb<E: Preset> {
    // --- versioning ---
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // --- history ---
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, E::HistoricalRootsLimit>,

    // --- eth1 ---
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
    pub eth1_deposit_index: u64,

    // --- registry ---
    pub validators: Validators<E>,
    pub balances: Balances<E>,

    // --- randomness ---
    pub randao_mixes: RandaoMixes<E>,

    // --- slashings ---
    pub slashings: FixedVector<Gwei, E::EpochsPerSlashingsVector>,

    // --- participation ---
    pub previous_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,
    pub current_epoch_participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit>,

    // --- finality ---
    pub justification_bits: BitVector<U4>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // --- inactivity ---
    pub inactivity_scores: VariableList<u64, E::ValidatorRegistryLimit>,

    // --- sync ---
    pub current_sync_committee: SyncCommittee<E>,
    pub next_sync_committee: SyncCommittee<E>,

    // --- execution ---
    pub latest_execution_payload_header: ExecutionPayloadHeaderDeneb<E>,

    // --- withdrawals ---
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,

    pub historical_summaries: VariableList<HistoricalSummary, E::HistoricalRootsLimit>,
}

/// A beacon state of any supported fork.
///
/// Each fork has its own SSZ schema; the variant records which one a value was
/// decoded with, and `from_ssz_bytes_for_fork` is the only way to choose it.
#[derive(Clone, Debug, PartialEq)]
pub enum BeaconState<E: Preset> {
    Bellatrix(BeaconStateBellatrix<E>),
    Capella(BeaconStateCapella<E>),
    Deneb(BeaconStateDeneb<E>),
}

/// Runs the same expression against whichever fork variant is present.
#[macro_export]
macro_rules! map_beacon_state {
    ($state:expr, |$inner:ident| $body:expr) => {
        match $state {
            $crate::BeaconState::Bellatrix($inner) => $body,
            $crate::BeaconState::Capella($inner) => $body,
            $crate::BeaconState::Deneb($inner) => $body,
        }
    };
}

impl<E: Preset> BeaconState<E> {
    pub fn from_ssz_bytes_for_fork(bytes: &[u8], fork: ForkName) -> Result<Self, DecodeError> {
        Ok(match fork {
            ForkName::Bellatrix => Self::Bellatrix(BeaconStateBellatrix::from_ssz_bytes(bytes)?),
            ForkName::Capella => Self::Capella(BeaconStateCapella::from_ssz_bytes(bytes)?),
            ForkName::Deneb => Self::Deneb(BeaconStateDeneb::from_ssz_bytes(bytes)?),
        })
    }

    pub fn as_ssz_bytes(&self) -> Vec<u8> {
        map_beacon_state!(self, |inner| inner.as_ssz_bytes())
    }

    pub fn tree_hash_root(&self) -> Hash256 {
        map_beacon_state!(self, |inner| inner.tree_hash_root())
    }

    pub fn fork_name(&self) -> ForkName {
        match self {
            BeaconState::Bellatrix(_) => ForkName::Bellatrix,
            BeaconState::Capella(_) => ForkName::Capella,
            BeaconState::Deneb(_) => ForkName::Deneb,
        }
    }

    pub fn slot(&self) -> Slot {
        map_beacon_state!(self, |inner| inner.slot)
    }

    pub fn slot_mut(&mut self) -> &mut Slot {
        map_beacon_state!(self, |inner| &mut inner.slot)
    }

    pub fn fork(&self) -> &Fork {
        map_beacon_state!(self, |inner| &inner.fork)
    }

    pub fn latest_block_header(&self) -> &BeaconBlockHeader {
        map_beacon_state!(self, |inner| &inner.latest_block_header)
    }

    pub fn latest_block_header_mut(&mut self) -> &mut BeaconBlockHeader {
        map_beacon_state!(self, |inner| &mut inner.latest_block_header)
    }

    pub fn validators(&self) -> &Validators<E> {
        map_beacon_state!(self, |inner| &inner.validators)
    }

    pub fn validators_mut(&mut self) -> &mut Validators<E> {
        map_beacon_state!(self, |inner| &mut inner.validators)
    }

    pub fn randao_mixes(&self) -> &RandaoMixes<E> {
        map_beacon_state!(self, |inner| &inner.randao_mixes)
    }

    pub fn randao_mixes_mut(&mut self) -> &mut RandaoMixes<E> {
        map_beacon_state!(self, |inner| &mut inner.randao_mixes)
    }

    pub fn eth1_data(&self) -> &Eth1Data {
        map_beacon_state!(self, |inner| &inner.eth1_data)
    }

    /// Root of a block body without operations for this fork.
    pub fn empty_body_root(&self, graffiti: Hash256) -> Hash256 {
        let eth1_data = self.eth1_data().clone();
        match self {
            BeaconState::Bellatrix(_) => {
                BeaconBlockBodyBellatrix::<E>::empty(eth1_data, graffiti).tree_hash_root()
            }
            BeaconState::Capella(_) => {
                BeaconBlockBodyCapella::<E>::empty(eth1_data, graffiti).tree_hash_root()
            }
            BeaconState::Deneb(_) => {
                BeaconBlockBodyDeneb::<E>::empty(eth1_data, graffiti).tree_hash_root()
            }
        }
    }

    /// Builds a state at slot 0 of `fork` with `validator_count` active validators, each
    /// at the maximum effective balance. Pubkeys are derived from the validator index
    /// and are not valid curve points.
    pub fn generate_genesis(
        fork: ForkName,
        config: &ChainConfig,
        validator_count: usize,
        genesis_time: u64,
    ) -> Self {
        let validators: Vec<Validator> = (0..validator_count)
            .map(|index| Validator {
                pubkey: interop_pubkey(index as u64),
                withdrawal_credentials: Hash256::ZERO,
                effective_balance: config.max_effective_balance,
                slashed: false,
                activation_eligibility_epoch: 0,
                activation_epoch: 0,
                exit_epoch: FAR_FUTURE_EPOCH,
                withdrawable_epoch: FAR_FUTURE_EPOCH,
            })
            .collect();
        let validators: Validators<E> = validators.into();
        let balances: Balances<E> = vec![config.max_effective_balance; validator_count].into();
        let participation: VariableList<ParticipationFlags, E::ValidatorRegistryLimit> =
            vec![0; validator_count].into();
        let inactivity_scores: VariableList<u64, E::ValidatorRegistryLimit> =
            vec![0; validator_count].into();

        let eth1_data = Eth1Data {
            deposit_root: Hash256::ZERO,
            deposit_count: validator_count as u64,
            block_hash: Hash256::repeat_byte(0x42),
        };

        let mut state = Self::Bellatrix(BeaconStateBellatrix {
            genesis_time,
            genesis_validators_root: validators.tree_hash_root(),
            slot: 0,
            fork: Fork::for_fork(fork, config, 0),
            latest_block_header: BeaconBlockHeader::default(),
            block_roots: FixedVector::from_elem(Hash256::ZERO),
            state_roots: FixedVector::from_elem(Hash256::ZERO),
            historical_roots: VariableList::empty(),
            eth1_data: eth1_data.clone(),
            eth1_data_votes: VariableList::empty(),
            eth1_deposit_index: validator_count as u64,
            validators,
            balances,
            randao_mixes: FixedVector::from_elem(eth1_data.block_hash),
            slashings: FixedVector::from_elem(0),
            previous_epoch_participation: participation.clone(),
            current_epoch_participation: participation,
            justification_bits: BitVector::new(),
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
            inactivity_scores,
            current_sync_committee: SyncCommittee::empty(),
            next_sync_committee: SyncCommittee::empty(),
            latest_execution_payload_header: ExecutionPayloadHeaderBellatrix::empty(),
        });

        if fork >= ForkName::Capella {
            state = state.upgrade_to_capella();
        }
        if fork >= ForkName::Deneb {
            state = state.upgrade_to_deneb();
        }
        *state.fork_mut() = Fork::for_fork(fork, config, 0);

        let body_root = state.empty_body_root(Hash256::ZERO);
        state.latest_block_header_mut().body_root = body_root;
        state
    }

    /// Processes an empty slot: fills the pending header's state root, records the
    /// previous roots and increments the slot. Epoch processing is not performed.
    pub fn advance_slot(&mut self) {
        let state_root = self.tree_hash_root();
        if self.latest_block_header().state_root == Hash256::ZERO {
            self.latest_block_header_mut().state_root = state_root;
        }
        let block_root = self.latest_block_header().tree_hash_root();
        let index = (self.slot() % E::SlotsPerHistoricalRoot::to_u64()) as usize;

        map_beacon_state!(self, |inner| {
            inner.state_roots[index] = state_root;
            inner.block_roots[index] = block_root;
            inner.slot += 1;
        });
    }

    fn fork_mut(&mut self) -> &mut Fork {
        map_beacon_state!(self, |inner| &mut inner.fork)
    }

    fn upgrade_to_capella(self) -> Self {
        let pre = match self {
            BeaconState::Bellatrix(pre) => pre,
            other => return other,
        };
        let header = pre.latest_execution_payload_header;
        Self::Capella(BeaconStateCapella {
            genesis_time: pre.genesis_time,
            genesis_validators_root: pre.genesis_validators_root,
            slot: pre.slot,
            fork: pre.fork,
            latest_block_header: pre.latest_block_header,
            block_roots: pre.block_roots,
            state_roots: pre.state_roots,
            historical_roots: pre.historical_roots,
            eth1_data: pre.eth1_data,
            eth1_data_votes: pre.eth1_data_votes,
            eth1_deposit_index: pre.eth1_deposit_index,
            validators: pre.validators,
            balances: pre.balances,
            randao_mixes: pre.randao_mixes,
            slashings: pre.slashings,
            previous_epoch_participation: pre.previous_epoch_participation,
            current_epoch_participation: pre.current_epoch_participation,
            justification_bits: pre.justification_bits,
            previous_justified_checkpoint: pre.previous_justified_checkpoint,
            current_justified_checkpoint: pre.current_justified_checkpoint,
            finalized_checkpoint: pre.finalized_checkpoint,
            inactivity_scores: pre.inactivity_scores,
            current_sync_committee: pre.current_sync_committee,
            next_sync_committee: pre.next_sync_committee,
            latest_execution_payload_header: ExecutionPayloadHeaderCapella {
                parent_hash: header.parent_hash,
                fee_recipient: header.fee_recipient,
                state_root: header.state_root,
                receipts_root: header.receipts_root,
                logs_bloom: header.logs_bloom,
                prev_randao: header.prev_randao,
                block_number: header.block_number,
                gas_limit: header.gas_limit,
                gas_used: header.gas_used,
                timestamp: header.timestamp,
                extra_data: header.extra_data,
                base_fee_per_gas: header.base_fee_per_gas,
                block_hash: header.block_hash,
                transactions_root: header.transactions_root,
                withdrawals_root: Hash256::ZERO,
            },
            next_withdrawal_index: 0,
            next_withdrawal_validator_index: 0,
            historical_summaries: VariableList::empty(),
        })
    }

    fn upgrade_to_deneb(self) -> Self {
        let pre = match self {
            BeaconState::Capella(pre) => pre,
            other => return other,
        };
        let header = pre.latest_execution_payload_header;
        Self::Deneb(BeaconStateDeneb {
            genesis_time: pre.genesis_time,
            genesis_validators_root: pre.genesis_validators_root,
            slot: pre.slot,
            fork: pre.fork,
            latest_block_header: pre.latest_block_header,
            block_roots: pre.block_roots,
            state_roots: pre.state_roots,
            historical_roots: pre.historical_roots,
            eth1_data: pre.eth1_data,
            eth1_data_votes: pre.eth1_data_votes,
            eth1_deposit_index: pre.eth1_deposit_index,
            validators: pre.validators,
            balances: pre.balances,
            randao_mixes: pre.randao_mixes,
            slashings: pre.slashings,
            previous_epoch_participation: pre.previous_epoch_participation,
            current_epoch_participation: pre.current_epoch_participation,
            justification_bits: pre.justification_bits,
            previous_justified_checkpoint: pre.previous_justified_checkpoint,
            current_justified_checkpoint: pre.current_justified_checkpoint,
            finalized_checkpoint: pre.finalized_checkpoint,
            inactivity_scores: pre.inactivity_scores,
            current_sync_committee: pre.current_sync_committee,
            next_sync_committee: pre.next_sync_committee,
            latest_execution_payload_header: ExecutionPayloadHeaderDeneb {
                parent_hash: header.parent_hash,
                fee_recipient: header.fee_recipient,
                state_root: header.state_root,
                receipts_root: header.receipts_root,
                logs_bloom: header.logs_bloom,
                prev_randao: header.prev_randao,
                block_number: header.block_number,
                gas_limit: header.gas_limit,
                gas_used: header.gas_used,
                timestamp: header.timestamp,
                extra_data: header.extra_data,
                base_fee_per_gas: header.base_fee_per_gas,
                block_hash: header.block_hash,
                transactions_root: header.transactions_root,
                withdrawals_root: header.withdrawals_root,
                blob_gas_used: 0,
                excess_blob_gas: 0,
            },
            next_withdrawal_index: pre.next_withdrawal_index,
            next_withdrawal_validator_index: pre.next_withdrawal_validator_index,
            historical_summaries: pre.historical_summaries,
        })
    }
}

fn interop_pubkey(index: u64) -> BlsPubkey {
    let mut pubkey = vec![0u8; 48];
    pubkey[0] = 0x80;
    pubkey[40..].copy_from_slice(&index.to_le_bytes());
    pubkey.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MainnetPreset, MinimalPreset};
    use chain::{MAINNET_CONFIG, MINIMAL_CONFIG};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ForkName::Bellatrix)]
    #[case(ForkName::Capella)]
    #[case(ForkName::Deneb)]
    fn test_generate_genesis(#[case] fork: ForkName) {
        let state = BeaconState::<MinimalPreset>::generate_genesis(fork, &MINIMAL_CONFIG, 16, 0);

        assert_eq!(state.fork_name(), fork);
        assert_eq!(state.slot(), 0);
        assert_eq!(state.validators().len(), 16);
        assert_eq!(state.fork().current_version, fork.fork_version(&MINIMAL_CONFIG));
        assert_eq!(
            state.latest_block_header().body_root,
            state.empty_body_root(Hash256::ZERO)
        );
    }

    #[rstest]
    #[case(ForkName::Bellatrix)]
    #[case(ForkName::Capella)]
    #[case(ForkName::Deneb)]
    fn test_decode_with_own_fork(#[case] fork: ForkName) {
        let state = BeaconState::<MinimalPreset>::generate_genesis(fork, &MINIMAL_CONFIG, 4, 7);
        let bytes = state.as_ssz_bytes();
        let decoded = BeaconState::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, fork).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_decode_with_wrong_fork_fails() {
        let state =
            BeaconState::<MinimalPreset>::generate_genesis(ForkName::Capella, &MINIMAL_CONFIG, 4, 0);
        let bytes = state.as_ssz_bytes();
        assert!(
            BeaconState::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, ForkName::Bellatrix)
                .is_err()
        );
    }

    #[test]
    fn test_decode_with_wrong_preset_fails() {
        let state =
            BeaconState::<MinimalPreset>::generate_genesis(ForkName::Capella, &MINIMAL_CONFIG, 4, 0);
        let bytes = state.as_ssz_bytes();
        assert!(
            BeaconState::<MainnetPreset>::from_ssz_bytes_for_fork(&bytes, ForkName::Capella)
                .is_err()
        );
    }

    #[test]
    fn test_advance_slot_fills_pending_header() {
        let mut state =
            BeaconState::<MainnetPreset>::generate_genesis(ForkName::Deneb, &MAINNET_CONFIG, 4, 0);
        let genesis_root = state.tree_hash_root();

        state.advance_slot();

        assert_eq!(state.slot(), 1);
        assert_eq!(state.latest_block_header().state_root, genesis_root);
        let BeaconState::Deneb(inner) = &state else {
            panic!("fork changed while advancing");
        };
        assert_eq!(inner.state_roots[0], genesis_root);
        assert_eq!(
            inner.block_roots[0],
            inner.latest_block_header.tree_hash_root()
        );
    }
}
