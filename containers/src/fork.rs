use crate::{Epoch, Version};
use chain::{ChainConfig, ForkName};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The `fork` field of a beacon state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct Fork {
    pub previous_version: Version,
    pub current_version: Version,
    pub epoch: Epoch,
}

impl Fork {
    /// The fork record of a chain that has been running `fork` since `epoch`.
    pub fn for_fork(fork: ForkName, config: &ChainConfig, epoch: Epoch) -> Self {
        Self {
            previous_version: fork.previous_fork_version(config),
            current_version: fork.fork_version(config),
            epoch,
        }
    }
}
