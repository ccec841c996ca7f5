use crate::{
    Attestation, AttesterSlashing, BlsSignature, Deposit, Eth1Data, ExecutionPayloadBellatrix,
    ExecutionPayloadCapella, ExecutionPayloadDeneb, Hash256, KzgCommitment, Preset,
    ProposerSlashing, SignedBlsToExecutionChange, SignedVoluntaryExit, SyncAggregate,
};
use ssz_derive::{Decode, Encode};
use ssz_types::VariableList;
use tree_hash_derive::TreeHash;

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockBodyBellatrix<E: Preset> {
    pub randao_reveal: BlsSignature,
    pub eth1_data: Eth1Data,
    pub graffiti: Hash256,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
    pub sync_aggregate: SyncAggregate<E>,
    pub execution_payload: ExecutionPayloadBellatrix<E>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockBodyCapella<E: Preset> {
    pub randao_reveal: BlsSignature,
    pub eth1_data: Eth1Data,
    pub graffiti: Hash256,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
    pub sync_aggregate: SyncAggregate<E>,
    pub execution_payload: ExecutionPayloadCapella<E>,
    pub bls_to_execution_changes:
        VariableList<SignedBlsToExecutionChange, E::MaxBlsToExecutionChanges>,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode, TreeHash)]
pub struct BeaconBlockBodyDeneb<E: Preset> {
    pub randao_reveal: BlsSignature,
    pub eth1_data: Eth1Data,
    pub graffiti: Hash256,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
    pub sync_aggregate: SyncAggregate<E>,
    pub execution_payload: ExecutionPayloadDeneb<E>,
    pub bls_to_execution_changes:
        VariableList<SignedBlsToExecutionChange, E::MaxBlsToExecutionChanges>,
    pub blob_kzg_commitments: VariableList<KzgCommitment, E::MaxBlobCommitmentsPerBlock>,
}

macro_rules! impl_empty_body {
    ($ty:ident, $payload:ident { $($extra:ident),* $(,)? }) => {
        impl<E: Preset> $ty<E> {
            /// A body with no operations, carrying `eth1_data` and `graffiti` only.
            pub fn empty(eth1_data: Eth1Data, graffiti: Hash256) -> Self {
                Self {
                    randao_reveal: crate::empty_signature(),
                    eth1_data,
                    graffiti,
                    proposer_slashings: VariableList::empty(),
                    attester_slashings: VariableList::empty(),
                    attestations: VariableList::empty(),
                    deposits: VariableList::empty(),
                    voluntary_exits: VariableList::empty(),
                    sync_aggregate: SyncAggregate::empty(),
                    execution_payload: $payload::empty(),
                    $($extra: VariableList::empty(),)*
                }
            }
        }
    };
}

impl_empty_body!(BeaconBlockBodyBellatrix, ExecutionPayloadBellatrix {});
impl_empty_body!(BeaconBlockBodyCapella, ExecutionPayloadCapella {
    bls_to_execution_changes,
});
impl_empty_body!(BeaconBlockBodyDeneb, ExecutionPayloadDeneb {
    bls_to_execution_changes,
    blob_kzg_commitments,
});
