pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod server;

pub use config::Config;
pub use error::ServiceError;
pub use model::{ModelHandle, ModelKind, Models, Predictor, StressLabel};
