//! Model initialization from a weights file
//!
//! Resolves the state dict inside a raw checkpoint, renames its layers to
//! the model convention and copies every matching tensor into the model.

use runtime_core::{CheckpointTree, ParamValue, Result, RuntimeConfig, StateDict};
use tracing::{debug, info, instrument};

use crate::compat;
use crate::model::ModelParameters;
use crate::naming::NamingConvention;
use crate::report::{self, LayerReport, LayerStatus, LoadReport};
use crate::transform;

/// Key under which checkpoints written by the trainer keep their model
pub const CLASSY_STATE_DICT_KEY: &str = "classy_state_dict";

/// How to find and rename the weights inside a raw checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightInitRequest<'a> {
    /// Descend into this key of the raw checkpoint first
    pub key_name: Option<&'a str>,

    /// Model layers containing any of these substrings are left untouched
    pub skip_layers: &'a [String],

    /// Prefix removed from checkpoint layer names (applied first)
    pub replace_prefix: Option<&'a str>,

    /// Prefix added to checkpoint layer names (applied second)
    pub append_prefix: Option<&'a str>,
}

impl<'a> WeightInitRequest<'a> {
    /// Request described by `MODEL.PARAMS_FILE`
    pub fn from_config(config: &'a RuntimeConfig) -> Self {
        let params = &config.model.params_file;
        Self {
            key_name: params.state_dict_key_name.as_deref(),
            skip_layers: &params.skip_layers,
            replace_prefix: params.remove_prefix.as_deref(),
            append_prefix: params.append_prefix.as_deref(),
        }
    }
}

/// Initialize `model` from a raw checkpoint.
///
/// Fails if `key_name` is missing from the checkpoint or if the renamed
/// state dict does not follow the model convention. A shape mismatch stops
/// the copy; layers copied before it keep their new values.
///
/// Diagnostics are logged only when `is_primary`; the report is returned
/// either way.
#[instrument(skip_all, fields(key_name = request.key_name.unwrap_or("")))]
pub fn init_model_from_weights<M: ModelParameters + ?Sized>(
    config: &RuntimeConfig,
    model: &mut M,
    mut raw: CheckpointTree,
    request: &WeightInitRequest<'_>,
    is_primary: bool,
) -> Result<LoadReport> {
    let key_name = request.key_name.filter(|key| !key.is_empty());
    let tree = match key_name {
        Some(key) => raw.take_dict(key)?,
        None => raw,
    };

    let state_dict = if key_name == Some(CLASSY_STATE_DICT_KEY) {
        let state_dict = classy_model_state_dict(config, tree)?;
        if is_primary {
            debug!(
                layers = state_dict.len(),
                trunk_prefix = %NamingConvention::for_modules(config).trunk_prefix,
                "Reconciled trainer checkpoint"
            );
        }
        state_dict
    } else {
        let mut state_dict = tree.into_params()?;
        if let Some(prefix) = request.replace_prefix.filter(|p| !p.is_empty()) {
            state_dict = transform::strip_prefix(&state_dict, prefix, "");
        }
        if let Some(prefix) = request.append_prefix.filter(|p| !p.is_empty()) {
            state_dict = transform::add_prefix(&state_dict, prefix);
        }
        compat::check(config, &state_dict)?;
        state_dict
    };

    apply_state_dict(model, &state_dict, request.skip_layers, is_primary)
}

/// Flatten a trainer checkpoint (`base_model.model.{trunk, heads}`) into one
/// state dict named after the model modules.
///
/// Head layers are merged last and win on a name collision.
pub fn classy_model_state_dict(
    config: &RuntimeConfig,
    mut classy_state_dict: CheckpointTree,
) -> Result<StateDict<ParamValue>> {
    let mut model = classy_state_dict
        .take_dict("base_model")?
        .take_dict("model")?;
    let trunk = model.take_dict("trunk")?.into_params()?;
    let heads = model.take_dict("heads")?.into_params()?;

    let convention = NamingConvention::for_modules(config);
    let mut state_dict = transform::into_prefixed(trunk, &convention.trunk_prefix);
    state_dict.extend(transform::into_prefixed(heads, &convention.head_prefix));
    Ok(state_dict)
}

/// Copy every layer of `source` the model has into the model.
///
/// This is the copy and reporting stage of [`init_model_from_weights`],
/// usable on a state dict that is already in the model convention.
pub fn apply_state_dict<M: ModelParameters + ?Sized>(
    model: &mut M,
    source: &StateDict<ParamValue>,
    skip_layers: &[String],
    is_primary: bool,
) -> Result<LoadReport> {
    let mut layers = Vec::new();
    for name in model.parameter_names() {
        if skip_layers.iter().any(|pattern| name.contains(pattern.as_str())) {
            layers.push(LayerReport {
                name,
                status: LayerStatus::Skipped,
            });
            continue;
        }

        let status = match (source.get(&name), model.parameter_mut(&name)) {
            (Some(value), Some(target)) => {
                let tensor = value.to_tensor()?;
                target.copy_from(&name, &tensor)?;
                LayerStatus::Loaded {
                    shape: tensor.shape().to_vec(),
                }
            }
            _ => LayerStatus::NotFound,
        };
        layers.push(LayerReport { name, status });
    }

    let load_report = LoadReport {
        layers,
        extra_layers: report::extra_layers(source, model),
    };

    if is_primary {
        load_report.log();
        info!(
            loaded = load_report.loaded_count(),
            extra = load_report.extra_layers.len(),
            "Model initialized from weights"
        );
    }
    Ok(load_report)
}
