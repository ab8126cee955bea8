//! Diagnostics of a weight initialization

use runtime_core::StateDict;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::ModelParameters;

/// What happened to one layer of the target model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LayerStatus {
    /// Copied from the checkpoint
    Loaded { shape: Vec<usize> },

    /// Name matched a skip pattern
    Skipped,

    /// No entry in the checkpoint; left as initialized
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    pub name: String,
    pub status: LayerStatus,
}

/// Per-layer outcome of loading a state dict into a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Every model layer, in model order
    pub layers: Vec<LayerReport>,

    /// Checkpoint layers the model has no parameter for
    pub extra_layers: Vec<String>,
}

impl LoadReport {
    pub fn status(&self, name: &str) -> Option<&LayerStatus> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| &layer.status)
    }

    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| matches!(s, LayerStatus::Loaded { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| *s == LayerStatus::Skipped)
    }

    pub fn not_found(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| *s == LayerStatus::NotFound)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded().count()
    }

    fn with_status<F>(&self, pred: F) -> impl Iterator<Item = &str>
    where
        F: Fn(&LayerStatus) -> bool,
    {
        self.layers
            .iter()
            .filter(move |layer| pred(&layer.status))
            .map(|layer| layer.name.as_str())
    }

    /// Emit one line per model layer plus the unused checkpoint layers
    pub fn log(&self) {
        let width = self
            .layers
            .iter()
            .map(|layer| layer.name.len())
            .max()
            .unwrap_or(0);

        for layer in &self.layers {
            match &layer.status {
                LayerStatus::Skipped => info!("Ignored layer:\t{}", layer.name),
                LayerStatus::Loaded { shape } => {
                    let padded = format!("{:<width$}", layer.name, width = width);
                    info!("Loaded: {} of shape: {:?} from checkpoint", padded, shape)
                }
                LayerStatus::NotFound => info!("Not found:\t\t{}, not initialized", layer.name),
            }
        }
        info!(
            extra_layers = ?self.extra_layers,
            loaded = self.loaded_count(),
            total = self.layers.len(),
            "Extra layers not loaded from checkpoint"
        );
    }
}

/// Debug dump of every parameter shape of a model
pub fn log_state_dict_shapes<M: ModelParameters + ?Sized>(model: &M) {
    debug!("Model state_dict:");
    for name in model.parameter_names() {
        if let Some(tensor) = model.parameter(&name) {
            debug!("{}:\t{:?}", name, tensor.shape());
        }
    }
}

/// Keys of `source` that `model` has no parameter for, in source order
pub fn extra_layers<V, M: ModelParameters + ?Sized>(source: &StateDict<V>, model: &M) -> Vec<String> {
    source
        .keys()
        .filter(|key| !model.contains_parameter(key))
        .map(str::to_string)
        .collect()
}
