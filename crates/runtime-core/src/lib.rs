//! Runtime Core - Foundation for checkpoint resume and weight initialization
//!
//! Provides the configuration surface, error handling, checkpoint naming
//! types and the state dict / tensor value types shared by the
//! `checkpoint` and `state-dict` crates.

pub mod config;
pub mod error;
pub mod state;
pub mod tensor;
pub mod types;

pub use config::{
    CheckpointConfig, DistributedConfig, ModelConfig, ParamsFileConfig, RuntimeConfig,
};
pub use error::{Error, Result};
pub use state::{CheckpointTree, StateDict, StateValue};
pub use tensor::{NdArray, ParamValue, Tensor};
pub use types::*;
