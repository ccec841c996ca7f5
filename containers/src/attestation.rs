use crate::{BlsSignature, Checkpoint, Hash256, Preset, Slot, ValidatorIndex};
use ssz_derive::{Decode, Encode};
use ssz_types::{BitList, VariableList};
use tree_hash_derive::TreeHash;

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: u64,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct Attestation<E: Preset> {
    pub aggregation_bits: BitList<E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: BlsSignature,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct IndexedAttestation<E: Preset> {
    pub attesting_indices: VariableList<ValidatorIndex, E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: BlsSignature,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct AttesterSlashing<E: Preset> {
    pub attestation_1: IndexedAttestation<E>,
    pub attestation_2: IndexedAttestation<E>,
}
