use chain::ConfigError;
use containers::{BlockHeaderError, PresetMismatch};
use std::path::PathBuf;

/// Why a single case's fixtures could not be turned into a test case.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("unable to read {file}: {source}")]
    Unreadable {
        file: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{0} is empty")]
    Empty(&'static str),
    #[error("unable to decompress {file}: {source}")]
    Decompress {
        file: &'static str,
        #[source]
        source: snap::Error,
    },
    #[error("unable to decode {file}: {reason}")]
    Ssz { file: &'static str, reason: String },
    #[error("{0} does not re-encode to the bytes it was decoded from")]
    NotCanonical(&'static str),
    #[error("{file} was written for {found}, but the suite runs {expected}")]
    SchemaMismatch {
        file: &'static str,
        expected: String,
        found: String,
    },
    #[error("invalid meta.yaml: {0}")]
    Metadata(#[from] serde_yaml::Error),
}

impl FixtureError {
    /// Schema mismatches point at the harness configuration rather than the fixture.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, FixtureError::SchemaMismatch { .. })
    }
}

/// Errors that abort a suite before any case runs.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("corpus directory {0} does not exist")]
    CorpusMissing(PathBuf),
    #[error("unable to read corpus directory {path}: {source}")]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preset mismatch: {0}")]
    PresetMismatch(#[from] PresetMismatch),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors while writing generated vectors.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error(transparent)]
    Transition(#[from] BlockHeaderError),
    #[error("unable to compress {file}: {source}")]
    Compress {
        file: &'static str,
        #[source]
        source: snap::Error,
    },
    #[error("unable to encode meta.yaml: {0}")]
    Metadata(#[from] serde_yaml::Error),
    #[error("unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
