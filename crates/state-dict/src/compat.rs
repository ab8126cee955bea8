//! Compatibility gate between a state dict and the model naming convention

use runtime_core::{Error, Result, RuntimeConfig, StateDict};

use crate::naming::NamingConvention;

/// Fail unless every key of `dict` starts with the trunk or head prefix of
/// the configured convention.
///
/// The error carries the expected prefixes; the fix is on the operator side
/// (`MODEL.PARAMS_FILE.REMOVE_PREFIX` / `APPEND_PREFIX`).
pub fn check<V>(config: &RuntimeConfig, dict: &StateDict<V>) -> Result<()> {
    check_convention(&NamingConvention::for_layers(config), dict)
}

pub fn check_convention<V>(convention: &NamingConvention, dict: &StateDict<V>) -> Result<()> {
    match dict.keys().find(|layer| !convention.accepts(layer)) {
        None => Ok(()),
        Some(layer) => Err(Error::IncompatibleStateDict {
            layer: layer.to_string(),
            expected_trunk_prefix: convention.trunk_prefix.clone(),
            expected_head_prefix: convention.head_prefix.clone(),
        }),
    }
}
