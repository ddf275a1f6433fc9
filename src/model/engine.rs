use anyhow::{bail, Context, Result};
use candle_core::{DType, Device, Tensor};
use std::path::Path;

use super::Predictor;
use crate::error::ServiceError;

/// Linear layer loaded from a safetensors artifact: `x · weightᵀ + bias`.
pub struct LinearModel {
    weight: Tensor,
    bias: Tensor,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self> {
        let device = Device::Cpu;
        let mut tensors = candle_core::safetensors::load(path, &device)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let weight = tensors
            .remove("weight")
            .ok_or_else(|| anyhow::anyhow!("{}: missing `weight` tensor", path.display()))?;
        let bias = tensors
            .remove("bias")
            .ok_or_else(|| anyhow::anyhow!("{}: missing `bias` tensor", path.display()))?;

        Self::new(weight, bias)
    }

    pub fn new(weight: Tensor, bias: Tensor) -> Result<Self> {
        let (outputs, _) = weight
            .dims2()
            .context("`weight` must be a [outputs, features] matrix")?;
        let bias_len = bias.dims1().context("`bias` must be a vector")?;
        if bias_len != outputs {
            bail!(
                "`bias` has {} entries but `weight` has {} outputs",
                bias_len,
                outputs
            );
        }
        Ok(Self {
            weight: weight.to_dtype(DType::F64)?,
            bias: bias.to_dtype(DType::F64)?,
        })
    }

    pub fn outputs(&self) -> usize {
        self.weight.dims()[0]
    }

    pub fn features(&self) -> usize {
        self.weight.dims()[1]
    }

    /// Returns the `[rows, outputs]` score matrix.
    pub fn forward(&self, x: &Tensor) -> std::result::Result<Tensor, ServiceError> {
        let (_, got) = x.dims2()?;
        if got != self.features() {
            return Err(ServiceError::MalformedInput {
                message: format!("expected {} features, got {}", self.features(), got),
            });
        }
        let x = x.to_dtype(DType::F64)?;
        Ok(x.matmul(&self.weight.t()?)?.broadcast_add(&self.bias)?)
    }
}

/// Predicts the class index with the highest score.
pub struct LinearClassifier(LinearModel);

impl LinearClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        Self::new(LinearModel::load(path)?)
            .with_context(|| format!("invalid classifier {}", path.display()))
    }

    pub fn new(model: LinearModel) -> Result<Self> {
        if model.outputs() == 0 {
            bail!("classifier has no classes");
        }
        Ok(Self(model))
    }

    pub fn model(&self) -> &LinearModel {
        &self.0
    }
}

impl Predictor for LinearClassifier {
    fn predict(&self, x: &Tensor) -> std::result::Result<Vec<f64>, ServiceError> {
        let scores = self.0.forward(x)?;
        let classes = scores.argmax(1)?.to_vec1::<u32>()?;
        Ok(classes.into_iter().map(f64::from).collect())
    }
}

/// Single-output linear regressor.
pub struct LinearRegressor(LinearModel);

impl LinearRegressor {
    pub fn load(path: &Path) -> Result<Self> {
        let model = LinearModel::load(path)?;
        if model.outputs() != 1 {
            bail!(
                "{}: regressor must have exactly one output, found {}",
                path.display(),
                model.outputs()
            );
        }
        Ok(Self(model))
    }

    pub fn model(&self) -> &LinearModel {
        &self.0
    }
}

impl Predictor for LinearRegressor {
    fn predict(&self, x: &Tensor) -> std::result::Result<Vec<f64>, ServiceError> {
        let out = self.0.forward(x)?.flatten_all()?.to_vec1::<f64>()?;
        Ok(out)
    }
}
