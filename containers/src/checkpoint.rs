use crate::{Epoch, Hash256};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A block root paired with the epoch it was justified or finalized at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode, TreeHash)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Hash256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz::{Decode, Encode};

    #[test]
    fn test_checkpoint_is_fixed_size() {
        let checkpoint = Checkpoint {
            epoch: 3,
            root: Hash256::repeat_byte(7),
        };
        let bytes = checkpoint.as_ssz_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(Checkpoint::from_ssz_bytes(&bytes).unwrap(), checkpoint);
    }
}
