//! Engine configuration (TOML) and its resolution from the environment.

pub mod engine;

pub use engine::{EngineConfig, KMeansConfig, DEFAULT_ENGINE_CONFIG_PATH, ENV_ENGINE_CONFIG_PATH};
