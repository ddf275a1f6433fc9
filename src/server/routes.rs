use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tiny_http::Method;

use crate::error::{Result, ServiceError};
use crate::model::{single_row, ModelKind, Models, Predictor, StressLabel};

pub const HEALTH_MESSAGE: &str = "🧠 StressMate ML API is running";

#[derive(Deserialize)]
struct PredictRequest {
    features: Vec<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ClassificationResult {
    pub label: i64,
    pub label_text: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RegressionResult {
    pub period_stress: f64,
}

/// A JSON reply. Faults are returned as `Err` and rendered by the server loop.
#[derive(Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn ok(body: impl Serialize) -> Result<Self> {
        Ok(Self {
            status: 200,
            body: serde_json::to_value(body)?,
        })
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

pub fn route(models: &Models, method: &Method, url: &str, body: &str) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Get, "/") => Reply::ok(json!({ "message": HEALTH_MESSAGE })),
        (Method::Post, "/predict/classifier") => {
            recover(predict_classifier(models, body).and_then(Reply::ok))
        }
        (Method::Post, "/predict/regressor") => {
            recover(predict_regressor(models, body).and_then(Reply::ok))
        }
        _ => Ok(Reply::error(404, "not found")),
    }
}

/// Only an unloaded model gets a structured error; everything else stays a fault.
fn recover(result: Result<Reply>) -> Result<Reply> {
    match result {
        Err(e @ ServiceError::ModelUnavailable(_)) => Ok(Reply::error(500, &e.to_string())),
        other => other,
    }
}

pub fn predict_classifier(models: &Models, body: &str) -> Result<ClassificationResult> {
    let model = require(models, ModelKind::Classifier)?;
    let value = predict_one(model, body)?;
    let label = StressLabel::from_prediction(value)?;
    Ok(ClassificationResult {
        label: label.index(),
        label_text: label.text(),
    })
}

pub fn predict_regressor(models: &Models, body: &str) -> Result<RegressionResult> {
    let model = require(models, ModelKind::Regressor)?;
    let value = predict_one(model, body)?;
    if !value.is_finite() {
        return Err(ServiceError::InvalidOutput {
            message: format!("regressor returned {value}"),
        });
    }
    Ok(RegressionResult {
        period_stress: round_to_cents(value),
    })
}

fn require(models: &Models, kind: ModelKind) -> Result<&dyn Predictor> {
    models
        .handle(kind)
        .get()
        .ok_or(ServiceError::ModelUnavailable(kind))
}

fn predict_one(model: &dyn Predictor, body: &str) -> Result<f64> {
    let request: PredictRequest = serde_json::from_str(body)?;
    let x = single_row(&request.features)?;
    model
        .predict(&x)?
        .first()
        .copied()
        .ok_or_else(|| ServiceError::InvalidOutput {
            message: "model returned no predictions".to_string(),
        })
}

/// Round to two decimals, half away from zero on the scaled value.
/// Exact ties go up in magnitude (`1.125 -> 1.13`), unlike banker's rounding.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelHandle;
    use candle_core::Tensor;

    /// Returns a fixed value regardless of input.
    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _x: &Tensor) -> Result<Vec<f64>> {
            Ok(vec![self.0])
        }
    }

    /// Sums the row, so identical input always gives identical output.
    struct RowSum;

    impl Predictor for RowSum {
        fn predict(&self, x: &Tensor) -> Result<Vec<f64>> {
            Ok(x.sum(1)?.to_vec1::<f64>()?)
        }
    }

    fn models(classifier: ModelHandle, regressor: ModelHandle) -> Models {
        Models {
            classifier,
            regressor,
        }
    }

    fn post(models: &Models, path: &str, body: &str) -> Result<Reply> {
        route(models, &Method::Post, path, body)
    }

    #[test]
    fn test_health_independent_of_models() {
        for m in [
            models(ModelHandle::Absent, ModelHandle::Absent),
            models(ModelHandle::loaded(Fixed(0.0)), ModelHandle::loaded(Fixed(1.0))),
        ] {
            let reply = route(&m, &Method::Get, "/", "").unwrap();
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, json!({ "message": HEALTH_MESSAGE }));
        }
    }

    #[test]
    fn test_classifier_not_loaded() {
        let m = models(ModelHandle::Absent, ModelHandle::loaded(Fixed(3.14159)));
        let reply = post(&m, "/predict/classifier", r#"{"features": [0.1, 0.2]}"#).unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, json!({ "error": "Classifier model not loaded" }));

        let reply = post(&m, "/predict/regressor", r#"{"features": [0.1, 0.2]}"#).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, json!({ "period_stress": 3.14 }));
    }

    #[test]
    fn test_regressor_not_loaded() {
        let m = models(ModelHandle::loaded(Fixed(1.0)), ModelHandle::Absent);
        let reply = post(&m, "/predict/regressor", r#"{"features": [1.0]}"#).unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, json!({ "error": "Regressor model not loaded" }));
    }

    #[test]
    fn test_unloaded_model_checked_before_body() {
        let m = models(ModelHandle::Absent, ModelHandle::Absent);
        let reply = post(&m, "/predict/classifier", "not json").unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, json!({ "error": "Classifier model not loaded" }));
    }

    #[test]
    fn test_classifier_label_text() {
        let m = models(ModelHandle::loaded(Fixed(2.0)), ModelHandle::Absent);
        let reply = post(&m, "/predict/classifier", r#"{"features": [0.1, 0.2, 0.3]}"#).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body,
            json!({ "label": 2, "label_text": "Moderate Stress" })
        );
    }

    #[test]
    fn test_classifier_idempotent() {
        let m = models(ModelHandle::loaded(RowSum), ModelHandle::Absent);
        let body = r#"{"features": [1.0, 0.5, 1.5]}"#;
        let first = post(&m, "/predict/classifier", body).unwrap();
        let second = post(&m, "/predict/classifier", body).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.body, json!({ "label": 3, "label_text": "High Stress" }));
    }

    #[test]
    fn test_out_of_range_label_is_fault() {
        let m = models(ModelHandle::loaded(Fixed(4.0)), ModelHandle::Absent);
        let result = post(&m, "/predict/classifier", r#"{"features": [0.1]}"#);
        assert!(matches!(result, Err(ServiceError::OutOfRangeLabel(4))));
    }

    #[test]
    fn test_missing_features_is_fault() {
        let m = models(ModelHandle::loaded(Fixed(0.0)), ModelHandle::loaded(Fixed(0.0)));
        for path in ["/predict/classifier", "/predict/regressor"] {
            let result = post(&m, path, r#"{"values": [0.1]}"#);
            assert!(matches!(result, Err(ServiceError::MalformedInput { .. })));
        }
    }

    #[test]
    fn test_non_numeric_features_is_fault() {
        let m = models(ModelHandle::loaded(Fixed(0.0)), ModelHandle::Absent);
        let result = post(&m, "/predict/classifier", r#"{"features": ["a", 1]}"#);
        assert!(matches!(result, Err(ServiceError::MalformedInput { .. })));
    }

    #[test]
    fn test_empty_prediction_is_fault() {
        struct Nothing;
        impl Predictor for Nothing {
            fn predict(&self, _x: &Tensor) -> Result<Vec<f64>> {
                Ok(vec![])
            }
        }
        let m = models(ModelHandle::Absent, ModelHandle::loaded(Nothing));
        let result = post(&m, "/predict/regressor", r#"{"features": [1.0]}"#);
        assert!(matches!(result, Err(ServiceError::InvalidOutput { .. })));
    }

    #[test]
    fn test_non_finite_regression_is_fault() {
        for raw in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let m = models(ModelHandle::Absent, ModelHandle::loaded(Fixed(raw)));
            let result = post(&m, "/predict/regressor", r#"{"features": [1.0]}"#);
            assert!(matches!(result, Err(ServiceError::InvalidOutput { .. })));
        }
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to_cents(3.14159), 3.14);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(1.125), 1.13);
        assert_eq!(round_to_cents(-0.125), -0.13);
        assert_eq!(round_to_cents(2.0), 2.0);
    }

    #[test]
    fn test_unknown_route() {
        let m = models(ModelHandle::Absent, ModelHandle::Absent);
        let reply = route(&m, &Method::Get, "/predict/classifier", "").unwrap();
        assert_eq!(reply.status, 404);
        let reply = post(&m, "/predict/other", "{}").unwrap();
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn test_query_string_ignored() {
        let m = models(ModelHandle::Absent, ModelHandle::Absent);
        let reply = route(&m, &Method::Get, "/?probe=1", "").unwrap();
        assert_eq!(reply.status, 200);
    }
}
