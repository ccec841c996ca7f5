use crate::{CaseId, FixtureError};
use chain::{ForkName, PresetName};
use containers::FieldDiff;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionDirection {
    /// The case expected a post-state but the transition returned an error.
    UnexpectedError,
    /// The case expected an error but the transition returned a state.
    UnexpectedSuccess,
}

/// Why a case failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    FixtureDecode {
        message: String,
    },
    /// The fixture belongs to another fork or preset: a harness configuration problem.
    SchemaMismatch {
        message: String,
    },
    TransitionRejection {
        direction: RejectionDirection,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    StateMismatch(FieldDiff),
    Crash {
        message: String,
    },
    Timeout {
        after_ms: u64,
    },
}

impl From<FixtureError> for Failure {
    fn from(err: FixtureError) -> Self {
        let message = err.to_string();
        if err.is_schema_mismatch() {
            Failure::SchemaMismatch { message }
        } else {
            Failure::FixtureDecode { message }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::FixtureDecode { message } => write!(f, "fixture decode error: {message}"),
            Failure::SchemaMismatch { message } => {
                write!(f, "schema mismatch (check harness fork/preset): {message}")
            }
            Failure::TransitionRejection {
                direction: RejectionDirection::UnexpectedError,
                error,
            } => write!(
                f,
                "transition rejected a valid block: {}",
                error.as_deref().unwrap_or("unknown error")
            ),
            Failure::TransitionRejection {
                direction: RejectionDirection::UnexpectedSuccess,
                ..
            } => f.write_str("transition accepted a block that must be rejected"),
            Failure::StateMismatch(diff) => write!(f, "post-state mismatch at {diff}"),
            Failure::Crash { message } => write!(f, "transition panicked: {message}"),
            Failure::Timeout { after_ms } => write!(f, "transition timed out after {after_ms} ms"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail(Failure),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Pass => None,
            Outcome::Fail(failure) => Some(failure),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    pub case: CaseId,
    pub outcome: Outcome,
}

/// One result per discovered case, in discovery order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub fork: ForkName,
    pub preset: PresetName,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CaseId, &Failure)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.failure().map(|failure| (&r.case, failure)))
    }

    pub fn outcome(&self, case_name: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|r| r.case.name == case_name)
            .map(|r| &r.outcome)
    }

    /// Panics with every failing case listed.
    pub fn assert_all_passed(&self) {
        if !self.is_success() {
            panic!("{self}");
        }
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}/{} block_header: {} passed, {} failed, {} total",
            self.preset,
            self.fork,
            self.passed(),
            self.failed(),
            self.total()
        )?;
        for (case, failure) in self.failures() {
            writeln!(f, "  FAIL {case}: {failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BLOCK_HEADER_HANDLER;
    use pretty_assertions::assert_eq;

    fn result(name: &str, outcome: Outcome) -> CaseResult {
        CaseResult {
            case: CaseId::new(PresetName::Minimal, ForkName::Capella, BLOCK_HEADER_HANDLER, name),
            outcome,
        }
    }

    fn report() -> SuiteReport {
        SuiteReport {
            fork: ForkName::Capella,
            preset: PresetName::Minimal,
            results: vec![
                result("a", Outcome::Pass),
                result(
                    "b",
                    Outcome::Fail(Failure::TransitionRejection {
                        direction: RejectionDirection::UnexpectedSuccess,
                        error: None,
                    }),
                ),
                result("c", Outcome::Fail(Failure::Timeout { after_ms: 50 })),
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!((report.passed(), report.failed(), report.total()), (1, 2, 3));
        assert!(!report.is_success());
        assert_eq!(report.outcome("a"), Some(&Outcome::Pass));
    }

    #[test]
    fn test_display_lists_failures() {
        assert_eq!(
            report().to_string(),
            "minimal/capella block_header: 1 passed, 2 failed, 3 total\n\
             \x20 FAIL minimal/capella/operations/block_header/b: transition accepted a block that must be rejected\n\
             \x20 FAIL minimal/capella/operations/block_header/c: transition timed out after 50 ms\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(&report()).unwrap();
        assert_eq!(json["results"][0]["outcome"], "pass");
        assert_eq!(
            json["results"][1]["outcome"]["fail"]["direction"],
            "unexpected_success"
        );
        assert_eq!(json["results"][2]["outcome"]["fail"]["kind"], "timeout");
        assert_eq!(json["results"][2]["case"]["preset"], "minimal");
    }

    #[test]
    #[should_panic(expected = "2 failed")]
    fn test_assert_all_passed_panics_on_failure() {
        report().assert_all_passed();
    }
}
