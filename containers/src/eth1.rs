use crate::{BlsPubkey, BlsSignature, Gwei, Hash256};
use ssz_derive::{Decode, Encode};
use ssz_types::FixedVector;
use tree_hash_derive::TreeHash;
use typenum::U33;

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct Eth1Data {
    pub deposit_root: Hash256,
    pub deposit_count: u64,
    pub block_hash: Hash256,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct DepositData {
    pub pubkey: BlsPubkey,
    pub withdrawal_credentials: Hash256,
    pub amount: Gwei,
    pub signature: BlsSignature,
}

/// A deposit together with its Merkle branch (depth 32 plus the length mix-in).
#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct Deposit {
    pub proof: FixedVector<Hash256, U33>,
    pub data: DepositData,
}
