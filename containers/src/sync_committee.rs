use crate::{BlsPubkey, BlsSignature, Preset};
use ssz_derive::{Decode, Encode};
use ssz_types::{BitVector, FixedVector};
use tree_hash_derive::TreeHash;

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct SyncCommittee<E: Preset> {
    pub pubkeys: FixedVector<BlsPubkey, E::SyncCommitteeSize>,
    pub aggregate_pubkey: BlsPubkey,
}

impl<E: Preset> SyncCommittee<E> {
    pub fn empty() -> Self {
        Self {
            pubkeys: FixedVector::from_elem(FixedVector::from_elem(0)),
            aggregate_pubkey: FixedVector::from_elem(0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct SyncAggregate<E: Preset> {
    pub sync_committee_bits: BitVector<E::SyncCommitteeSize>,
    pub sync_committee_signature: BlsSignature,
}

impl<E: Preset> SyncAggregate<E> {
    /// No participants, with the point-at-infinity signature.
    pub fn empty() -> Self {
        let mut signature = vec![0u8; 96];
        signature[0] = 0xc0;
        Self {
            sync_committee_bits: BitVector::new(),
            sync_committee_signature: signature.into(),
        }
    }
}
