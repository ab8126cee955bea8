//! Model seam: named, in-place assignable parameters

use runtime_core::{StateDict, Tensor};

/// A model exposing its parameters by layer name
pub trait ModelParameters {
    /// Layer names in the model's own order
    fn parameter_names(&self) -> Vec<String>;

    fn parameter(&self, name: &str) -> Option<&Tensor>;

    fn parameter_mut(&mut self, name: &str) -> Option<&mut Tensor>;

    fn contains_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }
}

impl ModelParameters for StateDict<Tensor> {
    fn parameter_names(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    fn parameter(&self, name: &str) -> Option<&Tensor> {
        self.get(name)
    }

    fn parameter_mut(&mut self, name: &str) -> Option<&mut Tensor> {
        self.get_mut(name)
    }
}
