use crate::{BlockHeaderCase, Expectation, Failure, Outcome, RejectionDirection};
use chain::ChainConfig;
use containers::{BeaconBlockHeader, BeaconState, CompareFields, FieldDiff, Preset};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_CASE_TIMEOUT: Duration = Duration::from_secs(60);

/// The state-transition function under test.
///
/// Implementations must not modify `pre`; any returned error counts as a rejection.
pub trait BlockHeaderTransition<E: Preset>: Send + Sync {
    fn apply(
        &self,
        pre: &BeaconState<E>,
        header: &BeaconBlockHeader,
        config: &ChainConfig,
    ) -> anyhow::Result<BeaconState<E>>;
}

impl<E, F> BlockHeaderTransition<E> for F
where
    E: Preset,
    F: Fn(&BeaconState<E>, &BeaconBlockHeader, &ChainConfig) -> anyhow::Result<BeaconState<E>>
        + Send
        + Sync,
{
    fn apply(
        &self,
        pre: &BeaconState<E>,
        header: &BeaconBlockHeader,
        config: &ChainConfig,
    ) -> anyhow::Result<BeaconState<E>> {
        self(pre, header, config)
    }
}

/// This workspace's own `process_block_header`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientTransition;

impl<E: Preset> BlockHeaderTransition<E> for ClientTransition {
    fn apply(
        &self,
        pre: &BeaconState<E>,
        header: &BeaconBlockHeader,
        config: &ChainConfig,
    ) -> anyhow::Result<BeaconState<E>> {
        Ok(pre.process_block_header(header, config)?)
    }
}

enum Invocation<E: Preset> {
    Returned(anyhow::Result<BeaconState<E>>),
    Panicked(String),
    TimedOut(Duration),
}

/// Runs decoded cases against a transition and judges the result.
pub struct CaseRunner<E: Preset> {
    transition: Arc<dyn BlockHeaderTransition<E>>,
    config: Arc<ChainConfig>,
    timeout: Option<Duration>,
}

impl<E: Preset> Clone for CaseRunner<E> {
    fn clone(&self) -> Self {
        Self {
            transition: self.transition.clone(),
            config: self.config.clone(),
            timeout: self.timeout,
        }
    }
}

impl<E: Preset> CaseRunner<E> {
    pub fn new(transition: Arc<dyn BlockHeaderTransition<E>>, config: Arc<ChainConfig>) -> Self {
        Self {
            transition,
            config,
            timeout: Some(DEFAULT_CASE_TIMEOUT),
        }
    }

    /// `None` runs the transition on the calling thread with no time limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn run(&self, case: BlockHeaderCase<E>) -> Outcome {
        let BlockHeaderCase {
            id,
            pre,
            header,
            expectation,
            ..
        } = case;

        let outcome = match (self.invoke(pre, header), expectation) {
            (Invocation::Returned(Ok(post)), Expectation::PostState(expected)) => {
                if post == expected {
                    Outcome::Pass
                } else {
                    Outcome::Fail(Failure::StateMismatch(
                        expected.first_difference(&post).unwrap_or_else(|| FieldDiff {
                            path: "<state>".to_string(),
                            expected: format!("{:?}", expected.tree_hash_root()),
                            actual: format!("{:?}", post.tree_hash_root()),
                        }),
                    ))
                }
            }
            (Invocation::Returned(Ok(_)), Expectation::Failure) => {
                Outcome::Fail(Failure::TransitionRejection {
                    direction: RejectionDirection::UnexpectedSuccess,
                    error: None,
                })
            }
            (Invocation::Returned(Err(err)), Expectation::PostState(_)) => {
                Outcome::Fail(Failure::TransitionRejection {
                    direction: RejectionDirection::UnexpectedError,
                    error: Some(format!("{err:#}")),
                })
            }
            (Invocation::Returned(Err(err)), Expectation::Failure) => {
                debug!(case = %id, error = %err, "Block rejected as expected");
                Outcome::Pass
            }
            (Invocation::Panicked(message), _) => Outcome::Fail(Failure::Crash { message }),
            (Invocation::TimedOut(after), _) => Outcome::Fail(Failure::Timeout {
                after_ms: saturating_millis(after),
            }),
        };

        if let Outcome::Fail(failure) = &outcome {
            warn!(case = %id, %failure, "Case failed");
        }
        outcome
    }

    fn invoke(&self, pre: BeaconState<E>, header: BeaconBlockHeader) -> Invocation<E> {
        let Some(timeout) = self.timeout else {
            return call(self.transition.as_ref(), &pre, &header, &self.config);
        };

        let transition = self.transition.clone();
        let config = self.config.clone();
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("block-header-case".to_string())
            .spawn(move || {
                // the receiver is gone once the case has timed out
                let _ = sender.send(call(transition.as_ref(), &pre, &header, &config));
            });
        if let Err(err) = spawned {
            return Invocation::Panicked(format!("unable to spawn case thread: {err}"));
        }

        match receiver.recv_timeout(timeout) {
            Ok(invocation) => invocation,
            Err(mpsc::RecvTimeoutError::Timeout) => Invocation::TimedOut(timeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Invocation::Panicked("case thread exited without a result".to_string())
            }
        }
    }
}

fn call<E: Preset>(
    transition: &dyn BlockHeaderTransition<E>,
    pre: &BeaconState<E>,
    header: &BeaconBlockHeader,
    config: &ChainConfig,
) -> Invocation<E> {
    match panic::catch_unwind(AssertUnwindSafe(|| transition.apply(pre, header, config))) {
        Ok(result) => Invocation::Returned(result),
        Err(payload) => Invocation::Panicked(panic_message(payload.as_ref())),
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CaseId, Metadata, BLOCK_HEADER_HANDLER};
    use chain::{ForkName, PresetName, MINIMAL_CONFIG};
    use containers::{BeaconBlock, Hash256, MinimalPreset};
    use containers::tree_hash::TreeHash;
    use pretty_assertions::assert_eq;

    type State = BeaconState<MinimalPreset>;

    fn case(valid: bool) -> BlockHeaderCase<MinimalPreset> {
        let mut pre = State::generate_genesis(ForkName::Capella, &MINIMAL_CONFIG, 16, 0);
        pre.advance_slot();
        let proposer = pre.get_beacon_proposer_index(&MINIMAL_CONFIG).unwrap();
        let block = BeaconBlock::empty(
            ForkName::Capella,
            if valid { 1 } else { 2 },
            proposer,
            pre.latest_block_header().tree_hash_root(),
            pre.eth1_data().clone(),
            Hash256::ZERO,
        );
        let header = block.block_header();
        let expectation = match pre.process_block_header(&header, &MINIMAL_CONFIG) {
            Ok(post) => Expectation::PostState(post),
            Err(_) => Expectation::Failure,
        };

        BlockHeaderCase {
            id: CaseId::new(PresetName::Minimal, ForkName::Capella, BLOCK_HEADER_HANDLER, "case"),
            metadata: Metadata::default(),
            pre,
            block,
            header,
            expectation,
        }
    }

    fn runner(transition: impl BlockHeaderTransition<MinimalPreset> + 'static) -> CaseRunner<MinimalPreset> {
        CaseRunner::new(Arc::new(transition), Arc::new(MINIMAL_CONFIG))
    }

    fn accept_all(pre: &State, _: &BeaconBlockHeader, _: &ChainConfig) -> anyhow::Result<State> {
        Ok(pre.clone())
    }

    fn reject_all(_: &State, _: &BeaconBlockHeader, _: &ChainConfig) -> anyhow::Result<State> {
        anyhow::bail!("rejected")
    }

    #[test]
    fn test_client_passes_both_expectations() {
        let runner = runner(ClientTransition);
        assert_eq!(runner.run(case(true)), Outcome::Pass);
        assert_eq!(runner.run(case(false)), Outcome::Pass);
    }

    #[test]
    fn test_expected_error_accepts_any_error() {
        assert_eq!(runner(reject_all).run(case(false)), Outcome::Pass);
    }

    #[test]
    fn test_unexpected_error() {
        assert_eq!(
            runner(reject_all).run(case(true)),
            Outcome::Fail(Failure::TransitionRejection {
                direction: RejectionDirection::UnexpectedError,
                error: Some("rejected".to_string()),
            })
        );
    }

    #[test]
    fn test_unexpected_success() {
        assert_eq!(
            runner(accept_all).run(case(false)),
            Outcome::Fail(Failure::TransitionRejection {
                direction: RejectionDirection::UnexpectedSuccess,
                error: None,
            })
        );
    }

    #[test]
    fn test_wrong_post_state_names_field() {
        let outcome = runner(accept_all).run(case(true));
        let Outcome::Fail(Failure::StateMismatch(diff)) = outcome else {
            panic!("unexpected outcome {outcome:?}");
        };
        assert_eq!(diff.path, "latest_block_header.slot");
        assert_eq!((diff.expected.as_str(), diff.actual.as_str()), ("1", "0"));
    }

    #[test]
    fn test_panic_is_a_crash_not_a_rejection() {
        let panicking = |_: &State, _: &BeaconBlockHeader, _: &ChainConfig| -> anyhow::Result<State> {
            panic!("boom")
        };
        for timeout in [None, Some(Duration::from_secs(5))] {
            let outcome = runner(panicking).with_timeout(timeout).run(case(false));
            assert_eq!(
                outcome,
                Outcome::Fail(Failure::Crash {
                    message: "boom".to_string()
                })
            );
        }
    }

    #[test]
    fn test_timeout_millis_saturate() {
        assert_eq!(saturating_millis(Duration::from_millis(50)), 50);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_hung_transition_times_out() {
        let sleepy = |pre: &State, _: &BeaconBlockHeader, _: &ChainConfig| -> anyhow::Result<State> {
            thread::sleep(Duration::from_secs(5));
            Ok(pre.clone())
        };
        let outcome = runner(sleepy)
            .with_timeout(Some(Duration::from_millis(50)))
            .run(case(true));
        assert_eq!(outcome, Outcome::Fail(Failure::Timeout { after_ms: 50 }));
    }
}
