use log::{error, info, warn};
use std::path::Path;

use super::{LinearClassifier, LinearRegressor, ModelKind, Predictor};
use crate::config::Config;

/// A model bound at startup, or absent if its artifact failed to load.
/// Never reloaded.
pub enum ModelHandle {
    Loaded(Box<dyn Predictor>),
    Absent,
}

impl ModelHandle {
    pub fn loaded(predictor: impl Predictor + 'static) -> Self {
        ModelHandle::Loaded(Box::new(predictor))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelHandle::Loaded(_))
    }

    pub fn get(&self) -> Option<&dyn Predictor> {
        match self {
            ModelHandle::Loaded(p) => Some(p.as_ref()),
            ModelHandle::Absent => None,
        }
    }
}

/// Both handles, immutable after startup and shared by reference with handlers.
pub struct Models {
    pub classifier: ModelHandle,
    pub regressor: ModelHandle,
}

impl Models {
    pub fn handle(&self, kind: ModelKind) -> &ModelHandle {
        match kind {
            ModelKind::Classifier => &self.classifier,
            ModelKind::Regressor => &self.regressor,
        }
    }
}

/// Attempt each artifact independently. A failure leaves that handle absent and
/// never stops the other model or the service from starting.
pub fn load_models(config: &Config) -> Models {
    Models {
        classifier: load_classifier(&config.classifier_path),
        regressor: load_regressor(&config.regressor_path),
    }
}

fn load_classifier(path: &Path) -> ModelHandle {
    match LinearClassifier::load(path) {
        Ok(model) => {
            info!(
                "classifier model loaded from {} ({} features, {} classes)",
                path.display(),
                model.model().features(),
                model.model().outputs()
            );
            ModelHandle::loaded(model)
        }
        Err(e) => {
            error!("error loading classifier model: {:#}", e);
            ModelHandle::Absent
        }
    }
}

fn load_regressor(path: &Path) -> ModelHandle {
    match LinearRegressor::load(path) {
        Ok(model) => {
            info!(
                "regressor model loaded from {} ({} features)",
                path.display(),
                model.model().features()
            );
            ModelHandle::loaded(model)
        }
        Err(e) => {
            warn!("regressor model not found or failed to load: {:#}", e);
            ModelHandle::Absent
        }
    }
}
