//! Trunk/head prefix conventions of the model

use runtime_core::RuntimeConfig;

pub const HEADS_PREFIX: &str = "heads.";
pub const TRUNK_PREFIX: &str = "trunk.";
pub const WRAPPED_TRUNK_PREFIX: &str = "trunk.base_model.";
pub const FEATURE_BLOCKS: &str = "_feature_blocks.";

/// Prefix pair every parameter name of the model starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    pub trunk_prefix: String,
    pub head_prefix: String,
}

impl NamingConvention {
    /// Module-level prefixes: `trunk.` / `heads.`.
    ///
    /// In feature evaluation mode the trunk sits inside a `base_model`
    /// wrapper, so it becomes `trunk.base_model.`.
    pub fn modules(feature_eval_mode: bool) -> Self {
        let trunk = if feature_eval_mode {
            WRAPPED_TRUNK_PREFIX
        } else {
            TRUNK_PREFIX
        };
        Self {
            trunk_prefix: trunk.to_string(),
            head_prefix: HEADS_PREFIX.to_string(),
        }
    }

    /// Layer-level prefixes a loadable state dict must use:
    /// `trunk._feature_blocks.` (or `trunk.base_model._feature_blocks.`) / `heads.`
    pub fn layers(feature_eval_mode: bool) -> Self {
        let modules = Self::modules(feature_eval_mode);
        Self {
            trunk_prefix: format!("{}{}", modules.trunk_prefix, FEATURE_BLOCKS),
            head_prefix: modules.head_prefix,
        }
    }

    pub fn for_modules(config: &RuntimeConfig) -> Self {
        Self::modules(config.model.feature_eval_mode)
    }

    pub fn for_layers(config: &RuntimeConfig) -> Self {
        Self::layers(config.model.feature_eval_mode)
    }

    /// Whether `layer` belongs to the trunk or a head under this convention
    pub fn accepts(&self, layer: &str) -> bool {
        layer.starts_with(&self.trunk_prefix) || layer.starts_with(&self.head_prefix)
    }
}
