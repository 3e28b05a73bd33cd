//! OpenAI Images adapter: synchronous single-call provider.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::config::OpenAiSettings;
use crate::error::{IllustratorError, Result};
use crate::provider::ProviderAdapter;
use crate::types::{AspectRatio, ProviderTask, Resolution, SynthesisRequest, TaskState};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const PROVIDER_NAME: &str = "openai";
const MODEL: &str = "gpt-image-1";

/// Adapter for the OpenAI Images API.
///
/// This provider is synchronous: one POST returns the finished image as
/// base64, so `submit` acknowledges directly into `Succeeded` carrying a
/// `data:` result URL and `download` decodes it locally without further
/// network I/O. The reliable, more expensive fallback.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    http: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiAdapter {
    pub fn new(settings: OpenAiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn submit(&self, request: &SynthesisRequest) -> Result<ProviderTask> {
        if request.reference_image_url.is_some() {
            // The generations endpoint takes no reference imagery.
            tracing::debug!("openai adapter ignores reference image URL");
        }

        let body = json!({
            "model": MODEL,
            "prompt": request.prompt,
            "size": size_for(request.aspect_ratio),
            "quality": quality_for(request.resolution),
            "output_format": request.output_format.as_str(),
            "n": 1,
        });

        let url = format!(
            "{}/v1/images/generations",
            self.settings.endpoint.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| IllustratorError::Network {
                context: format!("Cannot reach OpenAI at {}", self.settings.endpoint),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(IllustratorError::SubmitRejected {
                provider: PROVIDER_NAME.to_string(),
                message: format!("HTTP {}: {}", status, body_text),
            });
        }

        let json: Value = resp.json().await.map_err(|e| IllustratorError::Network {
            context: "Failed to parse OpenAI images response".into(),
            source: e,
        })?;

        parse_generation(&json, request.output_format.mime_type())
    }

    async fn poll(&self, task: ProviderTask) -> Result<ProviderTask> {
        // Synchronous provider: the task is already terminal after submit.
        Ok(task)
    }

    async fn download(&self, task: &ProviderTask) -> Result<Vec<u8>> {
        if task.state != TaskState::Succeeded {
            return Err(IllustratorError::TaskNotReady(task.state));
        }
        let url = task.result_url.as_deref().ok_or_else(|| {
            IllustratorError::InvalidResponse("succeeded task has no result URL".into())
        })?;
        decode_data_url(url)
    }
}

/// Closest supported generation size for the requested aspect ratio.
fn size_for(aspect_ratio: AspectRatio) -> &'static str {
    match aspect_ratio {
        AspectRatio::Square1x1 => "1024x1024",
        AspectRatio::Wide16x9 | AspectRatio::Standard4x3 => "1536x1024",
    }
}

fn quality_for(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::OneK => "medium",
        Resolution::TwoK => "high",
    }
}

/// Build a `Succeeded` task from a generations response, carrying the image
/// payload as a `data:` URL.
fn parse_generation(json: &Value, mime_type: &str) -> Result<ProviderTask> {
    let b64 = json
        .pointer("/data/0/b64_json")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            IllustratorError::InvalidResponse("OpenAI response missing data[0].b64_json".into())
        })?;
    let created = json.get("created").and_then(|v| v.as_u64()).unwrap_or(0);

    Ok(ProviderTask {
        id: format!("openai-{}", created),
        state: TaskState::Succeeded,
        result_url: Some(format!("data:{};base64,{}", mime_type, b64)),
        failure_reason: None,
    })
}

/// Decode the base64 payload of a `data:` URL.
fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url.split_once("base64,").map(|(_, b64)| b64).ok_or_else(|| {
        IllustratorError::InvalidResponse("result URL is not a base64 data URL".into())
    })?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| IllustratorError::DownloadFailed {
            provider: PROVIDER_NAME.to_string(),
            message: format!("invalid base64 payload: {}", e),
        })
}
