// src/config/engine.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_ENGINE_CONFIG_PATH: &str = "CLIMATE_CONFIG_PATH";

fn default_label_threshold() -> f64 {
    0.2
}
fn default_length_norm_words() -> f64 {
    5.0
}
fn default_tendency_threshold() -> f64 {
    0.2
}
fn default_neutral_weight() -> f64 {
    0.5
}
fn default_min_token_chars() -> usize {
    2
}
fn default_exemplar_count() -> usize {
    3
}
fn default_axis_min_texts() -> usize {
    5
}
fn default_axis_terms() -> usize {
    2
}
fn default_top_options() -> usize {
    5
}
fn default_offload_threshold() -> usize {
    200
}

/// Tunables of the response-climate engine. Every field has a default,
/// so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// `score > t` is positive, `score < -t` negative.
    #[serde(default = "default_label_threshold")]
    pub label_threshold: f64,
    /// Raw lexicon sum is divided by `max(1, tokens / length_norm_words)`.
    #[serde(default = "default_length_norm_words")]
    pub length_norm_words: f64,
    #[serde(default = "default_tendency_threshold")]
    pub tendency_threshold: f64,
    /// Weight of a neutral answer in the positivity score.
    #[serde(default = "default_neutral_weight")]
    pub neutral_weight: f64,
    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,
    /// How many top positive / negative texts are reported.
    #[serde(default = "default_exemplar_count")]
    pub exemplar_count: usize,
    /// Semantic axis is only attempted from this corpus size on.
    #[serde(default = "default_axis_min_texts")]
    pub axis_min_texts: usize,
    /// Terms per axis pole.
    #[serde(default = "default_axis_terms")]
    pub axis_terms: usize,
    #[serde(default = "default_top_options")]
    pub top_options: usize,
    /// Corpus size from which the HTTP layer moves work to the blocking pool.
    #[serde(default = "default_offload_threshold")]
    pub offload_threshold: usize,
    #[serde(default)]
    pub kmeans: KMeansConfig,
    /// Optional lexicon override (TOML with positive/negative/stopwords).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,
}

fn default_min_k() -> usize {
    2
}
fn default_max_k() -> usize {
    5
}
fn default_iterations() -> usize {
    8
}
fn default_top_terms() -> usize {
    6
}
fn default_samples() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Bounds for the automatic `round(sqrt(n))` cluster count.
    #[serde(default = "default_min_k")]
    pub min_k: usize,
    #[serde(default = "default_max_k")]
    pub max_k: usize,
    /// Fixed number of assign/update rounds (no convergence check).
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_top_terms")]
    pub top_terms: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            min_k: default_min_k(),
            max_k: default_max_k(),
            iterations: default_iterations(),
            top_terms: default_top_terms(),
            samples: default_samples(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label_threshold: default_label_threshold(),
            length_norm_words: default_length_norm_words(),
            tendency_threshold: default_tendency_threshold(),
            neutral_weight: default_neutral_weight(),
            min_token_chars: default_min_token_chars(),
            exemplar_count: default_exemplar_count(),
            axis_min_texts: default_axis_min_texts(),
            axis_terms: default_axis_terms(),
            top_options: default_top_options(),
            offload_threshold: default_offload_threshold(),
            kmeans: KMeansConfig::default(),
            lexicon_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s).context("parsing engine config TOML")?;
        Ok(cfg.sanitized())
    }

    /// Load from an explicit path. A relative `lexicon_path` inside the file
    /// is resolved against the file's directory.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&content)
            .with_context(|| format!("invalid engine config at {}", path.display()))?;
        if let (Some(lp), Some(dir)) = (cfg.lexicon_path.as_ref(), path.parent()) {
            if lp.is_relative() && !dir.as_os_str().is_empty() {
                cfg.lexicon_path = Some(dir.join(lp));
            }
        }
        Ok(cfg)
    }

    /// Resolve config using env var + fallbacks:
    /// 1) $CLIMATE_CONFIG_PATH (must exist)
    /// 2) config/engine.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_ENGINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_ENGINE_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let default_p = PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    /// Repair out-of-range values instead of rejecting the whole file.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        for (v, def) in [
            (&mut self.label_threshold, d.label_threshold),
            (&mut self.tendency_threshold, d.tendency_threshold),
            (&mut self.neutral_weight, d.neutral_weight),
        ] {
            if !v.is_finite() {
                *v = def;
            }
            *v = v.clamp(0.0, 1.0);
        }

        if !(self.length_norm_words.is_finite() && self.length_norm_words > 0.0) {
            self.length_norm_words = d.length_norm_words;
        }

        let km = &mut self.kmeans;
        km.min_k = km.min_k.max(1);
        km.max_k = km.max_k.max(1);
        if km.min_k > km.max_k {
            std::mem::swap(&mut km.min_k, &mut km.max_k);
        }
        km.iterations = km.iterations.max(1);

        self
    }
}
