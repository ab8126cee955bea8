//! Core type definitions for checkpoint discovery

use serde::{Deserialize, Serialize};
use std::fmt;

/// Training step and phase counters
pub type Iteration = u64;
pub type Phase = u64;

/// Extension of every snapshot file written by the training job
pub const CHECKPOINT_EXTENSION: &str = ".torch";

/// Tag of the snapshot marking a completed training run
pub const FINAL_TAG: &str = "model_final";

/// Tag of the end-of-phase snapshots
pub const PHASE_TAG: &str = "model_phase";

/// Tag of the mid-phase iteration snapshots
pub const ITERATION_TAG: &str = "model_iteration";

/// Checkpoint category encoded in the filename
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CheckpointKind {
    /// Snapshot written once training finished
    Final,

    /// Snapshot written at a phase boundary
    Phase,

    /// Snapshot written every N iterations
    Iteration,
}

impl CheckpointKind {
    /// Filename tag identifying this category
    pub fn tag(&self) -> &'static str {
        match self {
            CheckpointKind::Final => FINAL_TAG,
            CheckpointKind::Phase => PHASE_TAG,
            CheckpointKind::Iteration => ITERATION_TAG,
        }
    }

    /// Classify a filename by tag. The final tag wins over the others.
    pub fn classify(filename: &str) -> Option<Self> {
        [
            CheckpointKind::Final,
            CheckpointKind::Iteration,
            CheckpointKind::Phase,
        ]
        .into_iter()
        .find(|kind| filename.contains(kind.tag()))
    }
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointKind::Final => write!(f, "final"),
            CheckpointKind::Phase => write!(f, "phase"),
            CheckpointKind::Iteration => write!(f, "iteration"),
        }
    }
}

/// A snapshot file found in (or destined for) a checkpoint folder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckpointFile {
    /// File name relative to the checkpoint folder
    pub filename: String,

    /// Category encoded in the name
    pub kind: CheckpointKind,

    /// Phase or iteration number; `None` for final snapshots
    pub ordinal: Option<u64>,
}

impl CheckpointFile {
    /// `model_phase<N>.torch`
    pub fn phase(phase: Phase) -> Self {
        Self {
            filename: format!("{}{}{}", PHASE_TAG, phase, CHECKPOINT_EXTENSION),
            kind: CheckpointKind::Phase,
            ordinal: Some(phase),
        }
    }

    /// `model_iteration<N>.torch`
    pub fn iteration(iteration: Iteration) -> Self {
        Self {
            filename: format!("{}{}{}", ITERATION_TAG, iteration, CHECKPOINT_EXTENSION),
            kind: CheckpointKind::Iteration,
            ordinal: Some(iteration),
        }
    }

    /// `model_final_<suffix>.torch`
    pub fn final_checkpoint(suffix: &str) -> Self {
        Self {
            filename: format!("{}_{}{}", FINAL_TAG, suffix, CHECKPOINT_EXTENSION),
            kind: CheckpointKind::Final,
            ordinal: None,
        }
    }

    pub fn is_final(&self) -> bool {
        self.kind == CheckpointKind::Final
    }
}

impl fmt::Display for CheckpointFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}

/// Directory-level existence state of a checkpoint folder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FolderState {
    /// No snapshot files at all
    Empty,

    /// In-progress snapshots only
    HasCheckpoints,

    /// A final snapshot is present
    HasFinal,
}

/// Process position inside a distributed job
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankInfo {
    /// Rank on this machine
    pub local_rank: u32,

    /// Rank across the whole job
    pub dist_rank: u32,
}

impl RankInfo {
    pub fn new(local_rank: u32, dist_rank: u32) -> Self {
        Self {
            local_rank,
            dist_rank,
        }
    }

    /// Read `LOCAL_RANK` and `RANK` as set by the job launcher.
    /// Missing or unparsable values count as rank 0.
    pub fn from_env() -> Self {
        fn read(var: &str) -> u32 {
            std::env::var(var)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0)
        }
        Self::new(read("LOCAL_RANK"), read("RANK"))
    }

    /// Only the primary process of a machine emits informational diagnostics
    pub fn is_primary(&self) -> bool {
        self.local_rank == 0
    }
}
