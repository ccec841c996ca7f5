use crate::{
    BlockHeaderCase, BlockHeaderTransition, CaseId, CaseResult, CaseRunner, CaseSource, Failure,
    Outcome, SuiteError, SuiteReport, BLOCK_HEADER_HANDLER, DEFAULT_CASE_TIMEOUT,
};
use chain::{ChainConfig, ForkName, PresetContext};
use containers::Preset;
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs every `block_header` case of one fork under the preset `E`.
pub struct SuiteDriver<E: Preset> {
    source: Arc<dyn CaseSource>,
    transition: Arc<dyn BlockHeaderTransition<E>>,
    config: Option<ChainConfig>,
    parallel: bool,
    timeout: Option<Duration>,
    _phantom: PhantomData<E>,
}

impl<E: Preset> SuiteDriver<E> {
    pub fn new(
        source: impl CaseSource + 'static,
        transition: impl BlockHeaderTransition<E> + 'static,
    ) -> Self {
        Self {
            source: Arc::new(source),
            transition: Arc::new(transition),
            config: None,
            parallel: false,
            timeout: Some(DEFAULT_CASE_TIMEOUT),
            _phantom: PhantomData,
        }
    }

    /// Activates `config` instead of the built-in bundle of `E`.
    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Per-case watchdog; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Activates the preset on `context`, runs the suite and resets the context,
    /// whether or not the run succeeded.
    pub fn run_all(
        &self,
        fork: ForkName,
        context: &mut PresetContext,
    ) -> Result<SuiteReport, SuiteError> {
        let config = match &self.config {
            Some(config) => context.activate_config(config.clone()),
            None => context.activate(E::NAME),
        };
        let report = self.run_with_config(fork, config);
        context.reset()?;
        report
    }

    /// Runs against whatever `context` currently has active.
    pub fn run_active(
        &self,
        fork: ForkName,
        context: &PresetContext,
    ) -> Result<SuiteReport, SuiteError> {
        self.run_with_config(fork, context.current()?)
    }

    fn run_with_config(
        &self,
        fork: ForkName,
        config: Arc<ChainConfig>,
    ) -> Result<SuiteReport, SuiteError> {
        E::check_config(&config)?;

        let cases = self
            .source
            .list_cases(fork, E::NAME, BLOCK_HEADER_HANDLER)?;
        info!(
            preset = %E::NAME,
            %fork,
            cases = cases.len(),
            parallel = self.parallel,
            "Running block header suite"
        );

        let runner =
            CaseRunner::new(self.transition.clone(), config.clone()).with_timeout(self.timeout);
        let run_case = |id: &CaseId| CaseResult {
            case: id.clone(),
            outcome: self.run_case(&runner, id, &config),
        };

        let results: Vec<CaseResult> = if self.parallel {
            cases.par_iter().map(run_case).collect()
        } else {
            cases.iter().map(run_case).collect()
        };

        let report = SuiteReport {
            fork,
            preset: E::NAME,
            results,
        };
        info!(
            preset = %E::NAME,
            %fork,
            passed = report.passed(),
            failed = report.failed(),
            "Block header suite finished"
        );
        Ok(report)
    }

    fn run_case(&self, runner: &CaseRunner<E>, id: &CaseId, config: &ChainConfig) -> Outcome {
        match BlockHeaderCase::<E>::load(self.source.as_ref(), id, config) {
            Ok(case) => {
                debug!(case = %id, "Running case");
                runner.run(case)
            }
            Err(err) => {
                let failure = Failure::from(err);
                warn!(case = %id, %failure, "Unable to load case");
                Outcome::Fail(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientTransition, MemoryCorpus};
    use chain::{ConfigError, PresetName, MAINNET_CONFIG};
    use containers::{MainnetPreset, MinimalPreset};

    #[test]
    fn test_context_is_reset_after_run() {
        let mut context = PresetContext::new();
        let driver = SuiteDriver::<MinimalPreset>::new(MemoryCorpus::new(), ClientTransition);

        let report = driver.run_all(ForkName::Capella, &mut context).unwrap();

        assert_eq!(report.total(), 0);
        assert!(!context.is_active());
    }

    #[test]
    fn test_context_is_reset_after_preset_mismatch() {
        let mut context = PresetContext::new();
        let driver = SuiteDriver::<MinimalPreset>::new(MemoryCorpus::new(), ClientTransition)
            .with_config(MAINNET_CONFIG);

        assert!(matches!(
            driver.run_all(ForkName::Capella, &mut context),
            Err(SuiteError::PresetMismatch(_))
        ));
        assert!(!context.is_active());
    }

    #[test]
    fn test_run_active_needs_an_active_preset() {
        let context = PresetContext::new();
        let driver = SuiteDriver::<MainnetPreset>::new(MemoryCorpus::new(), ClientTransition);

        assert!(matches!(
            driver.run_active(ForkName::Deneb, &context),
            Err(SuiteError::Config(ConfigError::NoActivePreset))
        ));
    }

    #[test]
    fn test_run_active_uses_current_bundle() {
        let mut context = PresetContext::new();
        context.activate(PresetName::Mainnet);
        let driver = SuiteDriver::<MainnetPreset>::new(MemoryCorpus::new(), ClientTransition);

        let report = driver.run_active(ForkName::Deneb, &context).unwrap();
        assert_eq!(report.preset, PresetName::Mainnet);
        assert!(context.is_active());
    }
}
