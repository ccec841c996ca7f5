use crate::{ChainConfig, ConfigError, PresetName};
use std::sync::Arc;
use tracing::debug;

/// Owns the constant bundle that is active for a suite run.
///
/// The context is an ordinary value rather than process-wide state: whoever holds it
/// activates a bundle before a run and resets it afterwards, while the run itself only
/// sees the immutable `Arc<ChainConfig>` snapshot handed out by `activate`. Activations
/// nest, and `reset` restores whatever was active before.
#[derive(Debug, Default)]
pub struct PresetContext {
    stack: Vec<Arc<ChainConfig>>,
}

impl PresetContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the built-in bundle for `name`.
    pub fn activate(&mut self, name: PresetName) -> Arc<ChainConfig> {
        self.activate_config(name.config())
    }

    /// Installs a custom bundle, e.g. one read with `ChainConfig::load_from_files`.
    pub fn activate_config(&mut self, config: ChainConfig) -> Arc<ChainConfig> {
        let config = Arc::new(config);
        debug!(
            preset = %config.preset_base,
            depth = self.stack.len() + 1,
            "Preset activated"
        );
        self.stack.push(config.clone());
        config
    }

    pub fn current(&self) -> Result<Arc<ChainConfig>, ConfigError> {
        self.stack.last().cloned().ok_or(ConfigError::NoActivePreset)
    }

    /// Drops the active bundle and restores the one that was active before it.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        let popped = self.stack.pop().ok_or(ConfigError::NoActivePreset)?;
        debug!(
            preset = %popped.preset_base,
            depth = self.stack.len(),
            "Preset reset"
        );
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }
}
