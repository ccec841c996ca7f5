use crate::case::{BLOCK_FILE, META_FILE, POST_FILE, PRE_FILE};
use crate::decode::snappy_encode;
use crate::{CaseId, FilesystemCorpus, MemoryCorpus, Metadata, VectorError, BLOCK_HEADER_HANDLER};
use chain::{ChainConfig, ForkName};
use containers::tree_hash::TreeHash;
use containers::{BeaconBlock, BeaconState, BlockHeaderError, Hash256, Preset, Slot};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_VALIDATOR_COUNT: usize = 64;
pub const DEFAULT_SLOT: Slot = 64;

/// One generated `block_header` case. `post` is `None` when the block must be rejected.
#[derive(Clone, Debug)]
pub struct TestVector<E: Preset> {
    pub name: &'static str,
    pub description: &'static str,
    pub pre: BeaconState<E>,
    pub block: BeaconBlock<E>,
    pub post: Option<BeaconState<E>>,
}

impl<E: Preset> TestVector<E> {
    pub fn case_id(&self) -> CaseId {
        CaseId::new(E::NAME, self.pre.fork_name(), BLOCK_HEADER_HANDLER, self.name)
    }

    /// The case's files as they appear in a corpus: snappy-compressed SSZ plus `meta.yaml`.
    pub fn files(&self) -> Result<Vec<(&'static str, Vec<u8>)>, VectorError> {
        let compress = |file: &'static str, bytes: Vec<u8>| {
            snappy_encode(&bytes).map_err(|source| VectorError::Compress { file, source })
        };

        let meta = Metadata {
            description: Some(self.description.to_string()),
            bls_setting: None,
        };

        let mut files = vec![
            (META_FILE, serde_yaml::to_string(&meta)?.into_bytes()),
            (PRE_FILE, compress(PRE_FILE, self.pre.as_ssz_bytes())?),
            (BLOCK_FILE, compress(BLOCK_FILE, self.block.as_ssz_bytes())?),
        ];
        if let Some(post) = &self.post {
            files.push((POST_FILE, compress(POST_FILE, post.as_ssz_bytes())?));
        }
        Ok(files)
    }

    pub fn insert_into(&self, corpus: &mut MemoryCorpus) -> Result<(), VectorError> {
        let id = self.case_id();
        for (file, bytes) in self.files()? {
            corpus.insert(id.clone(), file, bytes);
        }
        Ok(())
    }

    /// Writes the case below `root` in the consensus-spec-tests layout.
    pub fn write_to(&self, root: &Path) -> Result<(), VectorError> {
        let dir = FilesystemCorpus::new(root).case_dir(&self.case_id());
        fs::create_dir_all(&dir).map_err(|source| VectorError::Write {
            path: dir.clone(),
            source,
        })?;

        for (file, bytes) in self.files()? {
            let path = dir.join(file);
            fs::write(&path, bytes).map_err(|source| VectorError::Write { path, source })?;
        }
        debug!(case = %self.case_id(), "Vector written");
        Ok(())
    }
}

/// Builds a small set of `block_header` cases from a synthetic state.
#[derive(Clone, Debug)]
pub struct VectorGenerator {
    fork: ForkName,
    config: ChainConfig,
    validator_count: usize,
    slot: Slot,
}

impl VectorGenerator {
    pub fn new(fork: ForkName, config: ChainConfig) -> Self {
        Self {
            fork,
            config,
            validator_count: DEFAULT_VALIDATOR_COUNT,
            slot: DEFAULT_SLOT,
        }
    }

    /// At least two validators are kept so that a wrong proposer exists.
    pub fn with_validators(mut self, count: usize) -> Self {
        self.validator_count = count.max(2);
        self
    }

    /// Slot of the generated blocks. Slot 0 is raised to 1, the first slot a block can
    /// follow genesis at, and `Slot::MAX` is lowered by one so `slot_mismatch` has a
    /// next slot to point at.
    pub fn at_slot(mut self, slot: Slot) -> Self {
        self.slot = slot.clamp(1, Slot::MAX - 1);
        self
    }

    /// State at `self.slot` whose latest header is the genesis header with its state root
    /// filled in.
    pub fn pre_state<E: Preset>(&self) -> BeaconState<E> {
        let mut state =
            BeaconState::generate_genesis(self.fork, &self.config, self.validator_count, 0);
        state.advance_slot();
        *state.slot_mut() = self.slot;
        state
    }

    pub fn generate<E: Preset>(&self) -> Result<Vec<TestVector<E>>, BlockHeaderError> {
        let pre = self.pre_state::<E>();
        let proposer = pre.get_beacon_proposer_index(&self.config)?;
        let parent_root = pre.latest_block_header().tree_hash_root();

        let block = |slot: Slot, proposer_index: u64, parent_root: Hash256| {
            BeaconBlock::empty(
                self.fork,
                slot,
                proposer_index,
                parent_root,
                pre.eth1_data().clone(),
                Hash256::ZERO,
            )
        };
        let valid_block = block(self.slot, proposer, parent_root);

        let mut slashed_pre = pre.clone();
        if let Some(validator) = slashed_pre.validators_mut().get_mut(proposer as usize) {
            validator.slashed = true;
        }

        let mut stale_pre = pre.clone();
        stale_pre.latest_block_header_mut().slot = self.slot;

        let cases = vec![
            (
                "valid_header",
                "a block from the expected proposer on top of the latest header",
                pre.clone(),
                valid_block.clone(),
            ),
            (
                "slot_mismatch",
                "the block slot is one past the state slot",
                pre.clone(),
                block(self.slot + 1, proposer, parent_root),
            ),
            (
                "wrong_proposer",
                "the block names a proposer other than the selected one",
                pre.clone(),
                block(
                    self.slot,
                    (proposer + 1) % self.validator_count as u64,
                    parent_root,
                ),
            ),
            (
                "parent_root_mismatch",
                "the parent root is not the root of the latest header",
                pre.clone(),
                block(self.slot, proposer, Hash256::repeat_byte(0xab)),
            ),
            (
                "proposer_slashed",
                "the selected proposer has been slashed",
                slashed_pre,
                valid_block.clone(),
            ),
            (
                "older_than_latest_header",
                "the latest header is already at the block slot",
                stale_pre,
                valid_block,
            ),
        ];

        let vectors: Vec<TestVector<E>> = cases
            .into_iter()
            .map(|(name, description, pre, block)| {
                let post = pre.process_block_header(&block.block_header(), &self.config).ok();
                TestVector {
                    name,
                    description,
                    pre,
                    block,
                    post,
                }
            })
            .collect();

        info!(
            preset = %E::NAME,
            fork = %self.fork,
            slot = self.slot,
            validators = self.validator_count,
            vectors = vectors.len(),
            "Generated block header vectors"
        );
        Ok(vectors)
    }
}
