use thiserror::Error;

use crate::model::ModelKind;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} model not loaded")]
    ModelUnavailable(ModelKind),

    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    #[error("predicted label index {0} is outside the label table")]
    OutOfRangeLabel(i64),

    #[error("model produced an unusable output: {message}")]
    InvalidOutput { message: String },

    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::MalformedInput {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
