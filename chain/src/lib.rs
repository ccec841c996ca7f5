pub mod config;
pub mod context;
pub mod fork;
pub mod preset;

pub use config::{ChainConfig, ConfigError, MAINNET_CONFIG, MINIMAL_CONFIG};
pub use context::PresetContext;
pub use fork::ForkName;
pub use preset::PresetName;
