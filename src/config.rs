// ./src/config.rs

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the commitment root is folded from leaf digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentScheme {
    /// One digest over the concatenation of every leaf digest.
    #[default]
    Flat,
    /// Pairwise hashing up to a single root, last node duplicated on odd levels.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashTreeConfig {
    pub root_bytes: usize,
    pub proof_bytes_per_transaction: usize,
}

impl Default for HashTreeConfig {
    fn default() -> Self {
        Self { root_bytes: 32, proof_bytes_per_transaction: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RleConfig {
    /// Shortest run that is emitted as a `[count unit]` token.
    pub min_run: usize,
}

impl Default for RleConfig {
    fn default() -> Self {
        Self { min_run: 4 }
    }
}

/// Lower bound on the reported wall time of each runner, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingFloorConfig {
    pub deflate: u64,
    pub hash_tree: u64,
    pub rle: u64,
}

impl Default for TimingFloorConfig {
    fn default() -> Self {
        Self { deflate: 10, hash_tree: 20, rle: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub log_level: String,
    pub commitment_scheme: CommitmentScheme,
    /// Divisor applied to the space-saved fraction to produce `efficiency`.
    pub efficiency_scale: f64,
    pub hash_tree: HashTreeConfig,
    pub rle: RleConfig,
    pub timing_floor_ms: TimingFloorConfig,
    /// Pause between simulated proof steps.
    pub proof_step_delay_ms: u64,
    /// Capacity of the progress event channel.
    pub event_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            commitment_scheme: CommitmentScheme::Flat,
            efficiency_scale: 1000.0,
            hash_tree: HashTreeConfig::default(),
            rle: RleConfig::default(),
            timing_floor_ms: TimingFloorConfig::default(),
            proof_step_delay_ms: 0,
            event_buffer: 64,
        }
    }
}

impl PipelineConfig {
    /// Loads the configuration from `path`. A missing file yields the
    /// default configuration; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Saves the current configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Read {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        fs::write(path, contents).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
