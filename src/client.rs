use anyhow::{Context, Result};
use std::time::Duration;

use crate::model::ModelKind;

pub const DEFAULT_URL: &str = "http://localhost:5000";

pub struct ClientResponse {
    pub status: u16,
    pub body: String,
}

impl ClientResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(2)))
        .timeout_global(Some(Duration::from_secs(30)))
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// GET the health endpoint.
pub fn health(base_url: &str) -> Result<ClientResponse> {
    let url = format!("{}/", base_url.trim_end_matches('/'));
    let response = agent()
        .get(&url)
        .call()
        .with_context(|| format!("failed to reach {}", url))?;
    read_response(response)
}

/// POST a feature vector to the endpoint for `kind`.
pub fn predict(base_url: &str, kind: ModelKind, features: &[f64]) -> Result<ClientResponse> {
    let url = format!(
        "{}/predict/{}",
        base_url.trim_end_matches('/'),
        kind.as_str()
    );
    let body = serde_json::json!({ "features": features }).to_string();
    let response = agent()
        .post(&url)
        .header("Content-Type", "application/json")
        .send(body.as_str())
        .with_context(|| format!("failed to reach {}", url))?;
    read_response(response)
}

fn read_response(response: ureq::http::Response<ureq::Body>) -> Result<ClientResponse> {
    let status = response.status().as_u16();
    let body = response.into_body().read_to_string()?;
    Ok(ClientResponse { status, body })
}

/// Parse a comma-separated feature list such as `0.1,0.2,0.3`.
pub fn parse_features(input: &str) -> Result<Vec<f64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid feature value `{}`", s))
        })
        .collect()
}
