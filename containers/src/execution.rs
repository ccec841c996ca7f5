use crate::{Address, Gwei, Hash256, Preset, Transactions, Uint256, ValidatorIndex};
use ssz_derive::{Decode, Encode};
use ssz_types::{FixedVector, VariableList};
use tree_hash_derive::TreeHash;

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct Withdrawal {
    pub index: u64,
    pub validator_index: ValidatorIndex,
    pub address: Address,
    pub amount: Gwei,
}

pub type Withdrawals<E> = VariableList<Withdrawal, <E as Preset>::MaxWithdrawalsPerPayload>;

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct HistoricalSummary {
    pub block_summary_root: Hash256,
    pub state_summary_root: Hash256,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadBellatrix<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions: Transactions<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadCapella<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions: Transactions<E>,
    pub withdrawals: Withdrawals<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadDeneb<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions: Transactions<E>,
    pub withdrawals: Withdrawals<E>,
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadHeaderBellatrix<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions_root: Hash256,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadHeaderCapella<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions_root: Hash256,
    pub withdrawals_root: Hash256,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ExecutionPayloadHeaderDeneb<E: Preset> {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: FixedVector<u8, E::BytesPerLogsBloom>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: VariableList<u8, E::MaxExtraDataBytes>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions_root: Hash256,
    pub withdrawals_root: Hash256,
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
}

/// The all-zero payload of a chain that has not seen an execution block yet.
macro_rules! impl_empty_payload {
    ($ty:ident { $($extra:ident: $value:expr),* $(,)? }) => {
        impl<E: Preset> $ty<E> {
            pub fn empty() -> Self {
                Self {
                    parent_hash: Hash256::ZERO,
                    fee_recipient: Address::ZERO,
                    state_root: Hash256::ZERO,
                    receipts_root: Hash256::ZERO,
                    logs_bloom: FixedVector::from_elem(0),
                    prev_randao: Hash256::ZERO,
                    block_number: 0,
                    gas_limit: 0,
                    gas_used: 0,
                    timestamp: 0,
                    extra_data: VariableList::empty(),
                    base_fee_per_gas: Uint256::ZERO,
                    block_hash: Hash256::ZERO,
                    $($extra: $value,)*
                }
            }
        }
    };
}

impl_empty_payload!(ExecutionPayloadBellatrix {
    transactions: VariableList::empty(),
});
impl_empty_payload!(ExecutionPayloadCapella {
    transactions: VariableList::empty(),
    withdrawals: VariableList::empty(),
});
impl_empty_payload!(ExecutionPayloadDeneb {
    transactions: VariableList::empty(),
    withdrawals: VariableList::empty(),
    blob_gas_used: 0,
    excess_blob_gas: 0,
});
impl_empty_payload!(ExecutionPayloadHeaderBellatrix {
    transactions_root: Hash256::ZERO,
});
impl_empty_payload!(ExecutionPayloadHeaderCapella {
    transactions_root: Hash256::ZERO,
    withdrawals_root: Hash256::ZERO,
});
impl_empty_payload!(ExecutionPayloadHeaderDeneb {
    transactions_root: Hash256::ZERO,
    withdrawals_root: Hash256::ZERO,
    blob_gas_used: 0,
    excess_blob_gas: 0,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MinimalPreset;
    use ssz::Encode;
    use tree_hash::TreeHash;

    #[test]
    fn test_capella_header_commits_to_withdrawals() {
        let bellatrix = ExecutionPayloadHeaderBellatrix::<MinimalPreset>::empty();
        let mut capella = ExecutionPayloadHeaderCapella::<MinimalPreset>::empty();
        assert_eq!(
            capella.as_ssz_bytes().len(),
            bellatrix.as_ssz_bytes().len() + 32
        );

        let empty_root = capella.tree_hash_root();
        capella.withdrawals_root = Hash256::repeat_byte(1);
        assert_ne!(capella.tree_hash_root(), empty_root);
    }
}
