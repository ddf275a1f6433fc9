pub mod engine;
mod inference;
mod labels;

use candle_core::{Device, Tensor};
use std::fmt;

use crate::error::ServiceError;

pub use engine::{LinearClassifier, LinearModel, LinearRegressor};
pub use inference::{load_models, ModelHandle, Models};
pub use labels::StressLabel;

/// Which of the two served models a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelKind {
    Classifier,
    Regressor,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Classifier => "classifier",
            ModelKind::Regressor => "regressor",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Classifier => f.write_str("Classifier"),
            ModelKind::Regressor => f.write_str("Regressor"),
        }
    }
}

/// A loaded model that scores a `[rows, features]` matrix, one value per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, x: &Tensor) -> Result<Vec<f64>, ServiceError>;
}

/// Reshape a feature vector into a single-sample `1 × N` matrix.
pub fn single_row(features: &[f64]) -> Result<Tensor, ServiceError> {
    Ok(Tensor::from_vec(
        features.to_vec(),
        (1, features.len()),
        &Device::Cpu,
    )?)
}
