//! Minimal dense tensor used as the parameter value type
//!
//! The training framework owns real device tensors. This type carries just
//! enough (shape + contiguous f32 data) to move weights between a checkpoint
//! and a model and to reject shape mismatches.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dense row-major f32 tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor, checking that `data` fills `shape`
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let Some(expected) = checked_numel(&shape) else {
            return Err(Error::InvalidTensor {
                shape,
                expected: usize::MAX,
                actual: data.len(),
            });
        };
        if expected != data.len() {
            return Err(Error::InvalidTensor {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let data = vec![0.0; numel(&shape)];
        Self { shape, data }
    }

    pub fn full(shape: Vec<usize>, value: f32) -> Self {
        let data = vec![value; numel(&shape)];
        Self { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Copy `src` into this tensor in place. Shapes must match exactly.
    pub fn copy_from(&mut self, layer: &str, src: &Tensor) -> Result<()> {
        if self.shape != src.shape {
            return Err(Error::ShapeMismatch {
                layer: layer.to_string(),
                expected: self.shape.clone(),
                actual: src.shape.clone(),
            });
        }
        if src.data.len() != self.data.len() {
            return Err(Error::InvalidTensor {
                shape: src.shape.clone(),
                expected: self.data.len(),
                actual: src.data.len(),
            });
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }
}

/// Raw f64 array as produced by non-tensor exporters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NdArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self { shape, data }
    }

    /// Convert to a tensor, narrowing to f32
    pub fn to_tensor(&self) -> Result<Tensor> {
        Tensor::new(
            self.shape.clone(),
            self.data.iter().map(|&v| v as f32).collect(),
        )
    }
}

/// A parameter as found in a checkpoint: a tensor or a raw array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Tensor(Tensor),
    Array(NdArray),
}

impl ParamValue {
    pub fn shape(&self) -> &[usize] {
        match self {
            ParamValue::Tensor(t) => t.shape(),
            ParamValue::Array(a) => &a.shape,
        }
    }

    /// Borrow as a tensor, converting raw arrays on the way
    pub fn to_tensor(&self) -> Result<std::borrow::Cow<'_, Tensor>> {
        match self {
            ParamValue::Tensor(t) => Ok(std::borrow::Cow::Borrowed(t)),
            ParamValue::Array(a) => a.to_tensor().map(std::borrow::Cow::Owned),
        }
    }
}

impl From<Tensor> for ParamValue {
    fn from(t: Tensor) -> Self {
        ParamValue::Tensor(t)
    }
}

impl From<NdArray> for ParamValue {
    fn from(a: NdArray) -> Self {
        ParamValue::Array(a)
    }
}

fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Element count of `shape`, `None` on overflow
fn checked_numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}
