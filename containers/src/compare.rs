use crate::*;
use serde::Serialize;
use std::fmt::{self, Debug};

/// The first field at which two values disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    /// Dotted path from the root value, e.g. `validators[3].slashed`.
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl FieldDiff {
    fn within(mut self, parent: &str) -> Self {
        self.path = format!("{parent}.{}", self.path);
        self
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Field-by-field equality that reports where two values first differ.
pub trait CompareFields {
    fn first_difference(&self, actual: &Self) -> Option<FieldDiff>;
}

pub fn leaf<T: PartialEq + Debug>(name: &str, expected: &T, actual: &T) -> Option<FieldDiff> {
    (expected != actual).then(|| FieldDiff {
        path: name.to_string(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

pub fn nested<T: CompareFields>(name: &str, expected: &T, actual: &T) -> Option<FieldDiff> {
    expected
        .first_difference(actual)
        .map(|diff| diff.within(name))
}

pub fn leaf_list<T: PartialEq + Debug>(
    name: &str,
    expected: &[T],
    actual: &[T],
) -> Option<FieldDiff> {
    length_difference(name, expected.len(), actual.len()).or_else(|| {
        expected
            .iter()
            .zip(actual)
            .enumerate()
            .find_map(|(index, (e, a))| leaf(&format!("{name}[{index}]"), e, a))
    })
}

pub fn nested_list<T: CompareFields>(
    name: &str,
    expected: &[T],
    actual: &[T],
) -> Option<FieldDiff> {
    length_difference(name, expected.len(), actual.len()).or_else(|| {
        expected
            .iter()
            .zip(actual)
            .enumerate()
            .find_map(|(index, (e, a))| nested(&format!("{name}[{index}]"), e, a))
    })
}

fn length_difference(name: &str, expected: usize, actual: usize) -> Option<FieldDiff> {
    (expected != actual).then(|| FieldDiff {
        path: format!("{name}.len()"),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

/// Implements `CompareFields` by visiting the listed fields in order with the named
/// helper (`leaf`, `nested`, `leaf_list` or `nested_list`).
macro_rules! impl_compare_fields {
    ($ty:ident $(<$param:ident>)? { $($kind:ident $field:ident),* $(,)? }) => {
        impl$(<$param: Preset>)? CompareFields for $ty$(<$param>)? {
            fn first_difference(&self, actual: &Self) -> Option<FieldDiff> {
                $(
                    if let Some(diff) = $kind(stringify!($field), &self.$field, &actual.$field) {
                        return Some(diff);
                    }
                )*
                None
            }
        }
    };
}

impl_compare_fields!(Checkpoint { leaf epoch, leaf root });
impl_compare_fields!(Fork {
    leaf previous_version,
    leaf current_version,
    leaf epoch,
});
impl_compare_fields!(BeaconBlockHeader {
    leaf slot,
    leaf proposer_index,
    leaf parent_root,
    leaf state_root,
    leaf body_root,
});
impl_compare_fields!(Eth1Data {
    leaf deposit_root,
    leaf deposit_count,
    leaf block_hash,
});
impl_compare_fields!(Validator {
    leaf pubkey,
    leaf withdrawal_credentials,
    leaf effective_balance,
    leaf slashed,
    leaf activation_eligibility_epoch,
    leaf activation_epoch,
    leaf exit_epoch,
    leaf withdrawable_epoch,
});
impl_compare_fields!(HistoricalSummary {
    leaf block_summary_root,
    leaf state_summary_root,
});
impl_compare_fields!(SyncCommittee<E> {
    leaf_list pubkeys,
    leaf aggregate_pubkey,
});
impl_compare_fields!(ExecutionPayloadHeaderBellatrix<E> {
    leaf parent_hash,
    leaf fee_recipient,
    leaf state_root,
    leaf receipts_root,
    leaf logs_bloom,
    leaf prev_randao,
    leaf block_number,
    leaf gas_limit,
    leaf gas_used,
    leaf timestamp,
    leaf extra_data,
    leaf base_fee_per_gas,
    leaf block_hash,
    leaf transactions_root,
});
impl_compare_fields!(ExecutionPayloadHeaderCapella<E> {
    leaf parent_hash,
    leaf fee_recipient,
    leaf state_root,
    leaf receipts_root,
    leaf logs_bloom,
    leaf prev_randao,
    leaf block_number,
    leaf gas_limit,
    leaf gas_used,
    leaf timestamp,
    leaf extra_data,
    leaf base_fee_per_gas,
    leaf block_hash,
    leaf transactions_root,
    leaf withdrawals_root,
});
impl_compare_fields!(ExecutionPayloadHeaderDeneb<E> {
    leaf parent_hash,
    leaf fee_recipient,
    leaf state_root,
    leaf receipts_root,
    leaf logs_bloom,
    leaf prev_randao,
    leaf block_number,
    leaf gas_limit,
    leaf gas_used,
    leaf timestamp,
    leaf extra_data,
    leaf base_fee_per_gas,
    leaf block_hash,
    leaf transactions_root,
    leaf withdrawals_root,
    leaf blob_gas_used,
    leaf excess_blob_gas,
});
impl_compare_fields!(BeaconStateBellatrix<E> {
    leaf genesis_time,
    leaf genesis_validators_root,
    leaf slot,
    nested fork,
    nested latest_block_header,
    leaf_list block_roots,
    leaf_list state_roots,
    leaf_list historical_roots,
    nested eth1_data,
    nested_list eth1_data_votes,
    leaf eth1_deposit_index,
    nested_list validators,
    leaf_list balances,
    leaf_list randao_mixes,
    leaf_list slashings,
    leaf_list previous_epoch_participation,
    leaf_list current_epoch_participation,
    leaf justification_bits,
    nested previous_justified_checkpoint,
    nested current_justified_checkpoint,
    nested finalized_checkpoint,
    leaf_list inactivity_scores,
    nested current_sync_committee,
    nested next_sync_committee,
    nested latest_execution_payload_header,
});
impl_compare_fields!(BeaconStateCapella<E> {
    leaf genesis_time,
    leaf genesis_validators_root,
    leaf slot,
    nested fork,
    nested latest_block_header,
    leaf_list block_roots,
    leaf_list state_roots,
    leaf_list historical_roots,
    nested eth1_data,
    nested_list eth1_data_votes,
    leaf eth1_deposit_index,
    nested_list validators,
    leaf_list balances,
    leaf_list randao_mixes,
    leaf_list slashings,
    leaf_list previous_epoch_participation,
    leaf_list current_epoch_participation,
    leaf justification_bits,
    nested previous_justified_checkpoint,
    nested current_justified_checkpoint,
    nested finalized_checkpoint,
    leaf_list inactivity_scores,
    nested current_sync_committee,
    nested next_sync_committee,
    nested latest_execution_payload_header,
    leaf next_withdrawal_index,
    leaf next_withdrawal_validator_index,
    nested_list historical_summaries,
});
impl_compare_fields!(BeaconStateDeneb<E> {
    leaf genesis_time,
    leaf genesis_validators_root,
    leaf slot,
    nested fork,
    nested latest_block_header,
    leaf_list block_roots,
    leaf_list state_roots,
    leaf_list historical_roots,
    nested eth1_data,
    nested_list eth1_data_votes,
    leaf eth1_deposit_index,
    nested_list validators,
    leaf_list balances,
    leaf_list randao_mixes,
    leaf_list slashings,
    leaf_list previous_epoch_participation,
    leaf_list current_epoch_participation,
    leaf justification_bits,
    nested previous_justified_checkpoint,
    nested current_justified_checkpoint,
    nested finalized_checkpoint,
    leaf_list inactivity_scores,
    nested current_sync_committee,
    nested next_sync_committee,
    nested latest_execution_payload_header,
    leaf next_withdrawal_index,
    leaf next_withdrawal_validator_index,
    nested_list historical_summaries,
});

impl<E: Preset> CompareFields for BeaconState<E> {
    fn first_difference(&self, actual: &Self) -> Option<FieldDiff> {
        match (self, actual) {
            (BeaconState::Bellatrix(e), BeaconState::Bellatrix(a)) => e.first_difference(a),
            (BeaconState::Capella(e), BeaconState::Capella(a)) => e.first_difference(a),
            (BeaconState::Deneb(e), BeaconState::Deneb(a)) => e.first_difference(a),
            (expected, actual) => Some(FieldDiff {
                path: "<fork>".to_string(),
                expected: expected.fork_name().to_string(),
                actual: actual.fork_name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::{ForkName, MINIMAL_CONFIG};
    use pretty_assertions::assert_eq;

    fn genesis(fork: ForkName) -> BeaconState<MinimalPreset> {
        BeaconState::generate_genesis(fork, &MINIMAL_CONFIG, 8, 0)
    }

    #[test]
    fn test_equal_states_have_no_difference() {
        let state = genesis(ForkName::Capella);
        assert_eq!(state.first_difference(&state.clone()), None);
    }

    #[test]
    fn test_nested_field_path() {
        let expected = genesis(ForkName::Capella);
        let mut actual = expected.clone();
        actual.latest_block_header_mut().proposer_index = 5;

        let diff = expected.first_difference(&actual).unwrap();
        assert_eq!(diff.path, "latest_block_header.proposer_index");
        assert_eq!(diff.expected, "0");
        assert_eq!(diff.actual, "5");
    }

    #[test]
    fn test_list_element_path() {
        let expected = genesis(ForkName::Deneb);
        let mut actual = expected.clone();
        actual.validators_mut()[3].slashed = true;

        assert_eq!(
            expected.first_difference(&actual).unwrap().path,
            "validators[3].slashed"
        );
    }

    #[test]
    fn test_list_length_path() {
        let expected = genesis(ForkName::Bellatrix);
        let actual = BeaconState::generate_genesis(ForkName::Bellatrix, &MINIMAL_CONFIG, 9, 0);

        let diff = expected.first_difference(&actual).unwrap();
        assert_eq!(diff.path, "genesis_validators_root");

        let BeaconState::Bellatrix(expected) = expected else {
            panic!("fork changed");
        };
        let BeaconState::Bellatrix(actual) = actual else {
            panic!("fork changed");
        };
        let diff = nested_list("validators", &expected.validators, &actual.validators).unwrap();
        assert_eq!(diff.path, "validators.len()");
        assert_eq!((diff.expected.as_str(), diff.actual.as_str()), ("8", "9"));
    }

    #[test]
    fn test_fork_variant_difference() {
        let diff = genesis(ForkName::Capella)
            .first_difference(&genesis(ForkName::Deneb))
            .unwrap();
        assert_eq!(diff.path, "<fork>");
        assert_eq!(diff.to_string(), "<fork>: expected capella, got deneb");
    }
}
