//! Runtime configuration types
//!
//! Mirrors the training configuration surface consumed by the resume and
//! weight-initialization logic. Keys are upper case so that a dumped
//! training config (`CHECKPOINT.DIR`, `MODEL.FEATURE_EVAL_MODE`, ...) can be
//! read without translation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct RuntimeConfig {
    /// Checkpoint settings
    pub checkpoint: CheckpointConfig,

    /// Distributed job settings
    pub distributed: DistributedConfig,

    /// Model settings
    pub model: ModelConfig,
}

impl RuntimeConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config: RuntimeConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint.latest_checkpoint_resume_file_num == 0 {
            return Err(Error::InvalidConfig {
                message: "CHECKPOINT.LATEST_CHECKPOINT_RESUME_FILE_NUM must be >= 1".to_string(),
            });
        }
        if self.distributed.num_nodes == 0 {
            return Err(Error::InvalidConfig {
                message: "DISTRIBUTED.NUM_NODES must be >= 1".to_string(),
            });
        }
        if self.distributed.num_nodes > 1
            && self.checkpoint.append_distr_run_id
            && self.distributed.run_id.is_empty()
        {
            return Err(Error::InvalidConfig {
                message: "DISTRIBUTED.RUN_ID is required when appending it to CHECKPOINT.DIR"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CheckpointConfig {
    /// Folder holding the training snapshots
    pub dir: Option<PathBuf>,

    /// Ignore an existing final checkpoint and train again
    pub overwrite_existing: bool,

    /// Resume from the checkpoint folder when it has checkpoints
    pub auto_resume: bool,

    /// Checkpoint every N iterations (0 = phase checkpoints only)
    pub checkpoint_iter_frequency: u64,

    /// Checkpoint every N phases
    pub checkpoint_frequency: u64,

    /// Resume from the Nth most recent checkpoint (1 = latest)
    pub latest_checkpoint_resume_file_num: usize,

    /// Append `DISTRIBUTED.RUN_ID` to the folder for multi-node jobs
    pub append_distr_run_id: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: None,
            overwrite_existing: false,
            auto_resume: true,
            checkpoint_iter_frequency: 0,
            checkpoint_frequency: 1,
            latest_checkpoint_resume_file_num: 1,
            append_distr_run_id: false,
        }
    }
}

/// Distributed job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct DistributedConfig {
    /// Number of machines in the job
    pub num_nodes: u32,

    /// Run identifier shared by every process of the job
    pub run_id: String,
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            num_nodes: 1,
            run_id: "auto".to_string(),
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ModelConfig {
    /// Trunk is wrapped inside a `base_model` container for feature evaluation
    pub feature_eval_mode: bool,

    /// Weights file used to initialize the model
    pub params_file: ParamsFileConfig,
}

/// Weights file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ParamsFileConfig {
    /// Path of the weights file
    pub path: Option<PathBuf>,

    /// Key holding the model state dict inside the weights file
    pub state_dict_key_name: Option<String>,

    /// Layers whose names contain any of these substrings are not loaded
    pub skip_layers: Vec<String>,

    /// Prefix removed from every layer name (applied first)
    pub remove_prefix: Option<String>,

    /// Prefix prepended to every layer name (applied second)
    pub append_prefix: Option<String>,
}
