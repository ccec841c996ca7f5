pub mod case;
pub mod corpus;
pub mod decode;
pub mod error;
pub mod macros;
pub mod report;
pub mod runner;
pub mod suite;
pub mod vectors;

pub use case::{BlockHeaderCase, Expectation, Metadata};
pub use corpus::{CaseId, CaseSource, FilesystemCorpus, MemoryCorpus, BLOCK_HEADER_HANDLER};
pub use error::{FixtureError, SuiteError, VectorError};
pub use report::{CaseResult, Failure, Outcome, RejectionDirection, SuiteReport};
pub use runner::{BlockHeaderTransition, CaseRunner, ClientTransition, DEFAULT_CASE_TIMEOUT};
pub use suite::SuiteDriver;
pub use vectors::{TestVector, VectorGenerator};

// re-exported for the test macros
pub use paste;
