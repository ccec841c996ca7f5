pub mod attestation;
pub mod block;
pub mod body;
pub mod checkpoint;
pub mod compare;
pub mod eth1;
pub mod execution;
pub mod exit;
pub mod fork;
pub mod preset;
pub mod shuffle;
pub mod state;
pub mod sync_committee;
pub mod transition;
pub mod types;
pub mod validator;

pub use attestation::{Attestation, AttestationData, AttesterSlashing, IndexedAttestation};
pub use block::{
    BeaconBlock, BeaconBlockBellatrix, BeaconBlockCapella, BeaconBlockDeneb, BeaconBlockHeader,
    ProposerSlashing, SignedBeaconBlockHeader,
};
pub use body::{BeaconBlockBodyBellatrix, BeaconBlockBodyCapella, BeaconBlockBodyDeneb};
pub use checkpoint::Checkpoint;
pub use compare::{CompareFields, FieldDiff};
pub use eth1::{Deposit, DepositData, Eth1Data};
pub use execution::{
    ExecutionPayloadBellatrix, ExecutionPayloadCapella, ExecutionPayloadDeneb,
    ExecutionPayloadHeaderBellatrix, ExecutionPayloadHeaderCapella, ExecutionPayloadHeaderDeneb,
    HistoricalSummary, Withdrawal,
};
pub use exit::{BlsToExecutionChange, SignedBlsToExecutionChange, SignedVoluntaryExit, VoluntaryExit};
pub use fork::Fork;
pub use preset::{MainnetPreset, MinimalPreset, Preset, PresetMismatch};
pub use shuffle::compute_shuffled_index;
pub use state::{BeaconState, BeaconStateBellatrix, BeaconStateCapella, BeaconStateDeneb};
pub use sync_committee::{SyncAggregate, SyncCommittee};
pub use transition::BlockHeaderError;
pub use types::*;
pub use validator::Validator;

pub use ssz;
pub use tree_hash;
