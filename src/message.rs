//! Line-oriented JSON envelope so a host process (for instance a browser
//! extension's native-messaging bridge) can ask for verdicts.
//!
//! Request: `{"type": "CHECK_EMAIL", "text": <any JSON>, "threshold"?: f64, "useExternalModel"?: bool}`
//! Response: `{"type": "CHECK_EMAIL_RESULT", "verdict": {...}}` or `{"type": "ERROR", "error": "..."}`

use crate::detector::{DetectOptions, PhishingDetector, Verdict};
use serde::{Deserialize, Serialize};

pub const CHECK_EMAIL: &str = "CHECK_EMAIL";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(rename = "type")]
    pub kind: String,
    /// Kept untyped: anything other than a JSON string is treated as missing text.
    #[serde(default)]
    pub text: serde_json::Value,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub use_external_model: bool,
}

impl CheckRequest {
    pub fn options(&self) -> DetectOptions {
        DetectOptions {
            threshold: self.threshold,
            use_external_model: self.use_external_model,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    CheckEmailResult { verdict: Verdict },
    Error { error: String },
}

pub async fn handle_request(detector: &PhishingDetector, request: &CheckRequest) -> Response {
    if request.kind != CHECK_EMAIL {
        return Response::Error {
            error: format!("unsupported message type: {}", request.kind),
        };
    }

    let verdict = detector
        .detect(request.text.as_str(), &request.options())
        .await;
    Response::CheckEmailResult { verdict }
}

/// Parses one line and answers it. Malformed input becomes an error response.
pub async fn handle_line(detector: &PhishingDetector, line: &str) -> Response {
    match serde_json::from_str::<CheckRequest>(line) {
        Ok(request) => handle_request(detector, &request).await,
        Err(e) => {
            log::warn!("Rejected malformed request: {}", e);
            Response::Error {
                error: format!("malformed request: {}", e),
            }
        }
    }
}
