use crate::decode::snappy_decode;
use crate::{CaseId, CaseSource, FixtureError};
use chain::{ChainConfig, ForkName, PresetName};
use containers::{BeaconBlock, BeaconBlockHeader, BeaconState, MainnetPreset, MinimalPreset, Preset};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PRE_FILE: &str = "pre.ssz_snappy";
pub const BLOCK_FILE: &str = "block.ssz_snappy";
pub const POST_FILE: &str = "post.ssz_snappy";
pub const META_FILE: &str = "meta.yaml";

/// What a case expects the transition to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Expectation<E: Preset> {
    PostState(BeaconState<E>),
    /// No `post.ssz_snappy`: the transition must reject the block.
    Failure,
}

/// Optional `meta.yaml` next to the fixtures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bls_setting: Option<u8>,
}

/// A fully decoded `operations/block_header` case.
#[derive(Clone, Debug)]
pub struct BlockHeaderCase<E: Preset> {
    pub id: CaseId,
    pub metadata: Metadata,
    pub pre: BeaconState<E>,
    pub block: BeaconBlock<E>,
    pub header: BeaconBlockHeader,
    pub expectation: Expectation<E>,
}

impl<E: Preset> BlockHeaderCase<E> {
    /// Reads and decodes the case's fixtures with the schema of `id.fork`.
    ///
    /// A missing post file means the case expects an error; a post file that is
    /// present but empty or undecodable is a fixture error.
    pub fn load(
        source: &dyn CaseSource,
        id: &CaseId,
        config: &ChainConfig,
    ) -> Result<Self, FixtureError> {
        let metadata = match read_optional(source, id, META_FILE)? {
            Some(bytes) => serde_yaml::from_slice(&bytes)?,
            None => Metadata::default(),
        };

        let pre = decode_state::<E>(PRE_FILE, &read_required(source, id, PRE_FILE)?, id.fork, config)?;
        let block = decode_block::<E>(BLOCK_FILE, &read_required(source, id, BLOCK_FILE)?, id.fork)?;

        let expectation = match read_optional(source, id, POST_FILE)? {
            Some(bytes) if bytes.is_empty() => return Err(FixtureError::Empty(POST_FILE)),
            Some(bytes) => Expectation::PostState(decode_state(POST_FILE, &bytes, id.fork, config)?),
            None => Expectation::Failure,
        };

        let header = block.block_header();
        debug!(
            case = %id,
            slot = header.slot,
            expects_post = matches!(expectation, Expectation::PostState(_)),
            "Loaded block header case"
        );

        Ok(Self {
            id: id.clone(),
            metadata,
            pre,
            block,
            header,
            expectation,
        })
    }
}

fn read_optional(
    source: &dyn CaseSource,
    id: &CaseId,
    file: &'static str,
) -> Result<Option<Vec<u8>>, FixtureError> {
    source
        .read(id, file)
        .map_err(|source| FixtureError::Unreadable { file, source })
}

fn read_required(
    source: &dyn CaseSource,
    id: &CaseId,
    file: &'static str,
) -> Result<Vec<u8>, FixtureError> {
    match read_optional(source, id, file)? {
        Some(bytes) if bytes.is_empty() => Err(FixtureError::Empty(file)),
        Some(bytes) => Ok(bytes),
        None => Err(FixtureError::Missing(file)),
    }
}

fn decompress(file: &'static str, compressed: &[u8]) -> Result<Vec<u8>, FixtureError> {
    snappy_decode(compressed).map_err(|source| FixtureError::Decompress { file, source })
}

pub fn decode_state<E: Preset>(
    file: &'static str,
    compressed: &[u8],
    fork: ForkName,
    config: &ChainConfig,
) -> Result<BeaconState<E>, FixtureError> {
    let bytes = decompress(file, compressed)?;

    let state = BeaconState::<E>::from_ssz_bytes_for_fork(&bytes, fork).map_err(|err| {
        schema_mismatch::<E>(file, fork, |preset, candidate| match preset {
            PresetName::Minimal => {
                BeaconState::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, candidate).is_ok()
            }
            PresetName::Mainnet => {
                BeaconState::<MainnetPreset>::from_ssz_bytes_for_fork(&bytes, candidate).is_ok()
            }
        })
        .unwrap_or_else(|| FixtureError::Ssz {
            file,
            reason: format!("{err:?}"),
        })
    })?;

    if state.as_ssz_bytes() != bytes {
        return Err(FixtureError::NotCanonical(file));
    }

    let version = state.fork().current_version;
    if version != fork.fork_version(config) {
        let found = match ForkName::from_fork_version(version, config) {
            Some(other) => format!("{}/{other}", E::NAME),
            None => format!("fork version 0x{}", hex::encode(version)),
        };
        return Err(FixtureError::SchemaMismatch {
            file,
            expected: format!("{}/{fork}", E::NAME),
            found,
        });
    }

    Ok(state)
}

pub fn decode_block<E: Preset>(
    file: &'static str,
    compressed: &[u8],
    fork: ForkName,
) -> Result<BeaconBlock<E>, FixtureError> {
    let bytes = decompress(file, compressed)?;

    let block = BeaconBlock::<E>::from_ssz_bytes_for_fork(&bytes, fork).map_err(|err| {
        schema_mismatch::<E>(file, fork, |preset, candidate| match preset {
            PresetName::Minimal => {
                BeaconBlock::<MinimalPreset>::from_ssz_bytes_for_fork(&bytes, candidate).is_ok()
            }
            PresetName::Mainnet => {
                BeaconBlock::<MainnetPreset>::from_ssz_bytes_for_fork(&bytes, candidate).is_ok()
            }
        })
        .unwrap_or_else(|| FixtureError::Ssz {
            file,
            reason: format!("{err:?}"),
        })
    })?;

    if block.as_ssz_bytes() != bytes {
        return Err(FixtureError::NotCanonical(file));
    }

    Ok(block)
}

/// After the suite's own schema failed, looks for another preset/fork schema that
/// accepts the bytes. Same-preset forks are tried first.
fn schema_mismatch<E: Preset>(
    file: &'static str,
    fork: ForkName,
    decodes: impl Fn(PresetName, ForkName) -> bool,
) -> Option<FixtureError> {
    let mut presets = PresetName::list_all();
    presets.sort_by_key(|preset| *preset != E::NAME);

    presets
        .into_iter()
        .flat_map(|preset| ForkName::list_all().into_iter().map(move |f| (preset, f)))
        .filter(|&(preset, candidate)| (preset, candidate) != (E::NAME, fork))
        .find(|&(preset, candidate)| decodes(preset, candidate))
        .map(|(preset, candidate)| FixtureError::SchemaMismatch {
            file,
            expected: format!("{}/{fork}", E::NAME),
            found: format!("{preset}/{candidate}"),
        })
}
