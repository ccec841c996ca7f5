use crate::{BlsPubkey, Epoch, Gwei, Hash256};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A registry entry. Balances live in a separate list on the state.
#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct Validator {
    pub pubkey: BlsPubkey,
    pub withdrawal_credentials: Hash256,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    /// `activation_epoch <= epoch < exit_epoch`
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::config::FAR_FUTURE_EPOCH;
    use rstest::rstest;
    use ssz_types::FixedVector;

    fn validator(activation_epoch: Epoch, exit_epoch: Epoch) -> Validator {
        Validator {
            pubkey: FixedVector::from_elem(0),
            withdrawal_credentials: Hash256::ZERO,
            effective_balance: 0,
            slashed: false,
            activation_eligibility_epoch: 0,
            activation_epoch,
            exit_epoch,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    #[rstest]
    #[case::before_activation(2, 5, 1, false)]
    #[case::at_activation(2, 5, 2, true)]
    #[case::before_exit(2, 5, 4, true)]
    #[case::at_exit(2, 5, 5, false)]
    #[case::never_exits(0, FAR_FUTURE_EPOCH, u64::MAX - 1, true)]
    fn test_activity_window(
        #[case] activation: Epoch,
        #[case] exit: Epoch,
        #[case] epoch: Epoch,
        #[case] active: bool,
    ) {
        assert_eq!(validator(activation, exit).is_active_at(epoch), active);
    }
}
