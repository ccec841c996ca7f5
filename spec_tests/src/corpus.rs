use crate::SuiteError;
use chain::{ForkName, PresetName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const BLOCK_HEADER_HANDLER: &str = "block_header";
pub const CORPUS_DIR_ENV: &str = "CONSENSUS_SPEC_TESTS_DIR";

const RUNNER: &str = "operations";
const SUITE: &str = "pyspec_tests";

/// Identifies one case directory in the corpus.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CaseId {
    pub preset: PresetName,
    pub fork: ForkName,
    pub handler: String,
    pub name: String,
}

impl CaseId {
    pub fn new(preset: PresetName, fork: ForkName, handler: &str, name: &str) -> Self {
        Self {
            preset,
            fork,
            handler: handler.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{RUNNER}/{}/{}",
            self.preset, self.fork, self.handler, self.name
        )
    }
}

/// Where fixtures come from.
pub trait CaseSource: Send + Sync {
    /// Every case for the fork, preset and handler, sorted by name.
    fn list_cases(
        &self,
        fork: ForkName,
        preset: PresetName,
        handler: &str,
    ) -> Result<Vec<CaseId>, SuiteError>;

    /// The contents of `file` in the case, or `None` if the case has no such file.
    fn read(&self, case: &CaseId, file: &str) -> io::Result<Option<Vec<u8>>>;
}

/// An unpacked consensus-spec-tests archive:
/// `<root>/tests/<preset>/<fork>/operations/<handler>/pyspec_tests/<case>/`.
#[derive(Clone, Debug)]
pub struct FilesystemCorpus {
    root: PathBuf,
}

impl FilesystemCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads the root from `CONSENSUS_SPEC_TESTS_DIR`, falling back to `default_root`.
    pub fn from_env(default_root: impl Into<PathBuf>) -> Self {
        match std::env::var_os(CORPUS_DIR_ENV) {
            Some(root) => Self::new(root),
            None => Self::new(default_root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn handler_dir(&self, fork: ForkName, preset: PresetName, handler: &str) -> PathBuf {
        self.root
            .join("tests")
            .join(preset.as_str())
            .join(fork.as_str())
            .join(RUNNER)
            .join(handler)
            .join(SUITE)
    }

    pub fn case_dir(&self, case: &CaseId) -> PathBuf {
        self.handler_dir(case.fork, case.preset, &case.handler)
            .join(&case.name)
    }
}

impl CaseSource for FilesystemCorpus {
    fn list_cases(
        &self,
        fork: ForkName,
        preset: PresetName,
        handler: &str,
    ) -> Result<Vec<CaseId>, SuiteError> {
        if !self.root.is_dir() {
            return Err(SuiteError::CorpusMissing(self.root.clone()));
        }

        let dir = self.handler_dir(fork, preset, handler);
        if !dir.is_dir() {
            return Err(SuiteError::CorpusMissing(dir));
        }

        let unreadable = |source: io::Error| SuiteError::CorpusUnreadable {
            path: dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map_err(unreadable)?.is_dir() {
                continue;
            }
            // kept under a lossy name so the case still gets an outcome; its files
            // will not be found under that name
            let name = entry.file_name();
            if name.to_str().is_none() {
                warn!(dir = %dir.display(), name = ?name, "Case directory name is not UTF-8");
            }
            names.push(name.to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| CaseId::new(preset, fork, handler, &name))
            .collect())
    }

    fn read(&self, case: &CaseId, file: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.case_dir(case).join(file)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Fixtures held in memory, keyed by case and file name.
#[derive(Clone, Debug, Default)]
pub struct MemoryCorpus {
    cases: BTreeMap<CaseId, BTreeMap<String, Vec<u8>>>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `case` with no files.
    pub fn add_case(&mut self, case: CaseId) {
        self.cases.entry(case).or_default();
    }

    pub fn insert(&mut self, case: CaseId, file: &str, bytes: Vec<u8>) {
        self.cases
            .entry(case)
            .or_default()
            .insert(file.to_string(), bytes);
    }

    pub fn remove(&mut self, case: &CaseId, file: &str) -> Option<Vec<u8>> {
        self.cases.get_mut(case)?.remove(file)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseSource for MemoryCorpus {
    fn list_cases(
        &self,
        fork: ForkName,
        preset: PresetName,
        handler: &str,
    ) -> Result<Vec<CaseId>, SuiteError> {
        Ok(self
            .cases
            .keys()
            .filter(|case| case.fork == fork && case.preset == preset && case.handler == handler)
            .cloned()
            .collect())
    }

    fn read(&self, case: &CaseId, file: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self
            .cases
            .get(case)
            .and_then(|files| files.get(file))
            .cloned())
    }
}
