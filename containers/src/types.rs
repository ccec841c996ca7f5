use crate::Preset;
use sha2::{Digest, Sha256};
use ssz_types::{FixedVector, VariableList};
use tree_hash::TreeHash;
use typenum::{U48, U96};

pub use alloy_primitives::{Address, B256 as Hash256, U256 as Uint256};

pub type Slot = u64;
pub type Epoch = u64;
pub type ValidatorIndex = u64;
pub type Gwei = u64;
pub type ParticipationFlags = u8;
pub type Version = [u8; 4];
pub type DomainType = [u8; 4];

pub type BlsPubkey = FixedVector<u8, U48>;
pub type BlsSignature = FixedVector<u8, U96>;
pub type KzgCommitment = FixedVector<u8, U48>;

pub type Transaction<E> = VariableList<u8, <E as Preset>::MaxBytesPerTransaction>;
pub type Transactions<E> = VariableList<Transaction<E>, <E as Preset>::MaxTransactionsPerPayload>;

pub const DOMAIN_BEACON_PROPOSER: DomainType = [0x00, 0x00, 0x00, 0x00];

/// The consensus hash function (SHA-256).
pub fn hash(input: &[u8]) -> [u8; 32] {
    Sha256::digest(input).into()
}

/// Compute the SSZ hash tree root for any type implementing `TreeHash`.
pub fn hash_tree_root<T: TreeHash>(value: &T) -> Hash256 {
    value.tree_hash_root()
}

pub fn empty_signature() -> BlsSignature {
    FixedVector::from_elem(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_sha256_of_empty_input() {
        assert_eq!(
            Hash256::from(hash(&[])),
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
                .parse::<Hash256>()
                .unwrap()
        );
    }

    #[test]
    fn root_of_zero_u64_is_zero_chunk() {
        assert_eq!(hash_tree_root(&0u64), Hash256::ZERO);
    }
}
