use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode upstream payload: {0}")]
    Decode(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthPayload {
    #[serde(default)]
    pub status: Option<String>,
}

impl HealthPayload {
    /// ONLINE requires the exact actuator value; `"up"` or any other casing
    /// counts as a degraded service.
    pub fn is_up(&self) -> bool {
        self.status.as_deref() == Some("UP")
    }
}

/// The prediction backend, as seen by the refresh cycle.
pub trait Upstream {
    fn health(&self) -> UpstreamResult<HealthPayload>;
    fn dashboard_metrics(&self) -> UpstreamResult<Value>;
    fn clients(&self, page: u32, size: u32) -> UpstreamResult<Vec<Value>>;
    fn predict(&self, profile: &Value) -> UpstreamResult<Value>;
}

pub struct HttpUpstream {
    agent: ureq::Agent,
    base_url: String,
    auth_header: Option<String>,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(15)))
        .build()
        .new_agent()
}

impl HttpUpstream {
    /// `auth_header` is an opaque, pre-formatted `Authorization` value
    /// (for example `Basic dXNlcjpwYXNz`) attached verbatim to every request.
    pub fn new(base_url: impl Into<String>, auth_header: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent: make_agent(),
            base_url,
            auth_header,
        }
    }

    fn get(&self, path: &str) -> UpstreamResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET upstream");
        let mut request = self.agent.get(&url);
        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }
        let response = request
            .call()
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        read_json(response)
    }

    fn post(&self, path: &str, body: &Value) -> UpstreamResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST upstream");
        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }
        let response = request
            .send_json(body)
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        read_json(response)
    }
}

fn read_json(response: ureq::http::Response<ureq::Body>) -> UpstreamResult<Value> {
    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.into_body().read_to_string().unwrap_or_default();
        return Err(UpstreamError::Status { status, message });
    }
    response
        .into_body()
        .read_json()
        .map_err(|err| UpstreamError::Decode(err.to_string()))
}

impl Upstream for HttpUpstream {
    fn health(&self) -> UpstreamResult<HealthPayload> {
        let payload = self.get("/actuator/health")?;
        serde_json::from_value(payload).map_err(|err| UpstreamError::Decode(err.to_string()))
    }

    fn dashboard_metrics(&self) -> UpstreamResult<Value> {
        self.get("/dashboard/metrics")
    }

    fn clients(&self, page: u32, size: u32) -> UpstreamResult<Vec<Value>> {
        let payload = self.get(&format!("/clients?page={page}&size={size}"))?;
        Ok(client_items(payload))
    }

    fn predict(&self, profile: &Value) -> UpstreamResult<Value> {
        self.post("/predict", profile)
    }
}

/// The clients endpoint answers with either a bare array or a Spring page
/// object carrying `content`.
fn client_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("content") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_is_up_only_on_the_exact_marker() {
        let up = HealthPayload {
            status: Some("UP".to_string()),
        };
        assert!(up.is_up());

        let lowercase = HealthPayload {
            status: Some("up".to_string()),
        };
        assert!(!lowercase.is_up());

        let missing = HealthPayload { status: None };
        assert!(!missing.is_up());
    }

    #[test]
    fn health_payload_tolerates_extra_fields() {
        let payload: HealthPayload =
            serde_json::from_value(json!({ "status": "UP", "components": {} })).unwrap();
        assert!(payload.is_up());

        let payload: HealthPayload = serde_json::from_value(json!({})).unwrap();
        assert!(!payload.is_up());
    }

    #[test]
    fn client_listings_accept_both_wire_shapes() {
        let bare = json!([{ "clientId": 1 }, { "clientId": 2 }]);
        assert_eq!(client_items(bare).len(), 2);

        let paged = json!({ "content": [{ "clientId": 1 }], "totalElements": 1 });
        assert_eq!(client_items(paged).len(), 1);

        let neither = json!({ "unexpected": true });
        assert!(client_items(neither).is_empty());

        assert!(client_items(Value::Null).is_empty());
    }
}
