use crate::{
    BeaconBlockBodyBellatrix, BeaconBlockBodyCapella, BeaconBlockBodyDeneb, BlsSignature,
    Eth1Data, Hash256, Preset, Slot, ValidatorIndex,
};
use chain::ForkName;
use ssz::{Decode, DecodeError, Encode};
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// A block with its body replaced by the body's hash tree root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: BlsSignature,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockBellatrix<E: Preset> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBodyBellatrix<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockCapella<E: Preset> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBodyCapella<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockDeneb<E: Preset> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBodyDeneb<E>,
}

/// An unsigned block of any supported fork.
#[derive(Clone, Debug, PartialEq)]
pub enum BeaconBlock<E: Preset> {
    Bellatrix(BeaconBlockBellatrix<E>),
    Capella(BeaconBlockCapella<E>),
    Deneb(BeaconBlockDeneb<E>),
}

macro_rules! map_beacon_block {
    ($block:expr, |$inner:ident| $body:expr) => {
        match $block {
            BeaconBlock::Bellatrix($inner) => $body,
            BeaconBlock::Capella($inner) => $body,
            BeaconBlock::Deneb($inner) => $body,
        }
    };
}

impl<E: Preset> BeaconBlock<E> {
    /// A block of `fork` with no operations and a zero state root.
    pub fn empty(
        fork: ForkName,
        slot: Slot,
        proposer_index: ValidatorIndex,
        parent_root: Hash256,
        eth1_data: Eth1Data,
        graffiti: Hash256,
    ) -> Self {
        match fork {
            ForkName::Bellatrix => Self::Bellatrix(BeaconBlockBellatrix {
                slot,
                proposer_index,
                parent_root,
                state_root: Hash256::ZERO,
                body: BeaconBlockBodyBellatrix::empty(eth1_data, graffiti),
            }),
            ForkName::Capella => Self::Capella(BeaconBlockCapella {
                slot,
                proposer_index,
                parent_root,
                state_root: Hash256::ZERO,
                body: BeaconBlockBodyCapella::empty(eth1_data, graffiti),
            }),
            ForkName::Deneb => Self::Deneb(BeaconBlockDeneb {
                slot,
                proposer_index,
                parent_root,
                state_root: Hash256::ZERO,
                body: BeaconBlockBodyDeneb::empty(eth1_data, graffiti),
            }),
        }
    }

    /// Decodes `bytes` with the block schema of `fork`.
    pub fn from_ssz_bytes_for_fork(bytes: &[u8], fork: ForkName) -> Result<Self, DecodeError> {
        Ok(match fork {
            ForkName::Bellatrix => Self::Bellatrix(BeaconBlockBellatrix::from_ssz_bytes(bytes)?),
            ForkName::Capella => Self::Capella(BeaconBlockCapella::from_ssz_bytes(bytes)?),
            ForkName::Deneb => Self::Deneb(BeaconBlockDeneb::from_ssz_bytes(bytes)?),
        })
    }

    pub fn as_ssz_bytes(&self) -> Vec<u8> {
        map_beacon_block!(self, |inner| inner.as_ssz_bytes())
    }

    pub fn fork_name(&self) -> ForkName {
        match self {
            BeaconBlock::Bellatrix(_) => ForkName::Bellatrix,
            BeaconBlock::Capella(_) => ForkName::Capella,
            BeaconBlock::Deneb(_) => ForkName::Deneb,
        }
    }

    pub fn slot(&self) -> Slot {
        map_beacon_block!(self, |inner| inner.slot)
    }

    pub fn tree_hash_root(&self) -> Hash256 {
        map_beacon_block!(self, |inner| inner.tree_hash_root())
    }

    /// The header this block commits to; `body_root` is the body's hash tree root.
    pub fn block_header(&self) -> BeaconBlockHeader {
        map_beacon_block!(self, |inner| BeaconBlockHeader {
            slot: inner.slot,
            proposer_index: inner.proposer_index,
            parent_root: inner.parent_root,
            state_root: inner.state_root,
            body_root: inner.body.tree_hash_root(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MinimalPreset;
    use pretty_assertions::assert_eq;

    fn capella_block() -> BeaconBlock<MinimalPreset> {
        BeaconBlock::Capella(BeaconBlockCapella {
            slot: 9,
            proposer_index: 4,
            parent_root: Hash256::repeat_byte(1),
            state_root: Hash256::repeat_byte(2),
            body: BeaconBlockBodyCapella::empty(Eth1Data::default(), Hash256::repeat_byte(3)),
        })
    }

    #[test]
    fn test_header_and_block_share_root() {
        let block = capella_block();
        let header = block.block_header();

        assert_eq!(header.slot, 9);
        assert_eq!(header.proposer_index, 4);
        assert_eq!(header.tree_hash_root(), block.tree_hash_root());
    }

    #[test]
    fn test_decode_with_own_fork() {
        let block = capella_block();
        let bytes = block.as_ssz_bytes();
        let decoded =
            BeaconBlock::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, ForkName::Capella)
                .unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.fork_name(), ForkName::Capella);
    }

    #[test]
    fn test_decode_with_other_fork_fails() {
        let bytes = capella_block().as_ssz_bytes();
        assert!(
            BeaconBlock::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, ForkName::Deneb).is_err()
        );
    }
}
