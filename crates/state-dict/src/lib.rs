//! State dict reconciliation
//!
//! Renames checkpoint layers onto the model's trunk/head convention, checks
//! that the result is loadable and copies the weights into a live model.
//!
//! ```
//! use runtime_core::{ParamValue, StateDict, Tensor};
//! use state_dict::{add_prefix, strip_prefix};
//!
//! let mut saved: StateDict<ParamValue> = StateDict::new();
//! saved.insert("module.conv1.weight", Tensor::zeros(vec![4]).into());
//!
//! let renamed = add_prefix(&strip_prefix(&saved, "module.", ""), "trunk._feature_blocks.");
//! assert!(renamed.contains_key("trunk._feature_blocks.conv1.weight"));
//! ```

pub mod compat;
pub mod init;
pub mod model;
pub mod naming;
pub mod report;
pub mod transform;

#[cfg(test)]
mod testing;

pub use compat::check;
pub use init::{
    apply_state_dict, classy_model_state_dict, init_model_from_weights, WeightInitRequest,
    CLASSY_STATE_DICT_KEY,
};
pub use model::ModelParameters;
pub use naming::NamingConvention;
pub use report::{LayerReport, LayerStatus, LoadReport};
pub use transform::{add_prefix, strip_prefix};
