//! Kie.ai adapter: task-based synthesis over `createTask`/`recordInfo`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::KieSettings;
use crate::error::{IllustratorError, Result};
use crate::provider::ProviderAdapter;
use crate::types::{ProviderTask, SynthesisRequest, TaskState};

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const PROVIDER_NAME: &str = "kie";
const MODEL: &str = "flux-kontext-pro";

/// Adapter for the Kie.ai image generation API.
///
/// Kie is the cheap primary: submission returns a task id, status is polled
/// via `recordInfo`, and the finished image is fetched from a result URL.
#[derive(Debug, Clone)]
pub struct KieAdapter {
    http: reqwest::Client,
    settings: KieSettings,
}

impl KieAdapter {
    pub fn new(settings: KieSettings) -> Self {
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ProviderAdapter for KieAdapter {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn submit(&self, request: &SynthesisRequest) -> Result<ProviderTask> {
        let mut body = json!({
            "model": MODEL,
            "prompt": request.prompt,
            "aspectRatio": request.aspect_ratio.as_str(),
            "resolution": request.resolution.as_str(),
            "outputFormat": request.output_format.as_str(),
        });
        if let Some(reference) = &request.reference_image_url {
            body["inputImage"] = json!(reference);
        }

        let resp = self
            .http
            .post(self.url("/api/v1/jobs/createTask"))
            .bearer_auth(&self.settings.api_key)
            .timeout(SUBMIT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| IllustratorError::Network {
                context: format!("Cannot reach Kie.ai at {}", self.settings.endpoint),
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
            context: "Failed to parse Kie.ai createTask response".into(),
            source: e,
        })?;

        let task_id = parse_task_id(&json)?;
        Ok(ProviderTask::polling(task_id))
    }

    async fn poll(&self, task: ProviderTask) -> Result<ProviderTask> {
        let resp = self
            .http
            .get(self.url("/api/v1/jobs/recordInfo"))
            .query(&[("taskId", task.id.as_str())])
            .bearer_auth(&self.settings.api_key)
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(|e| IllustratorError::Network {
                context: "Failed to poll Kie.ai task status".into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(IllustratorError::Http {
                status,
                body: body_text,
            });
        }

        let json: Value = resp.json().await.map_err(|e| IllustratorError::Network {
            context: "Failed to parse Kie.ai recordInfo response".into(),
            source: e,
        })?;

        Ok(apply_record_info(task, &json))
    }

    async fn download(&self, task: &ProviderTask) -> Result<Vec<u8>> {
        if task.state != TaskState::Succeeded {
            return Err(IllustratorError::TaskNotReady(task.state));
        }
        let url = task.result_url.as_deref().ok_or_else(|| {
            IllustratorError::InvalidResponse("succeeded task has no result URL".into())
        })?;

        let resp = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| IllustratorError::DownloadFailed {
                provider: PROVIDER_NAME.to_string(),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(IllustratorError::DownloadFailed {
                provider: PROVIDER_NAME.to_string(),
                message: format!("result URL returned HTTP {}", resp.status().as_u16()),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| IllustratorError::DownloadFailed {
                provider: PROVIDER_NAME.to_string(),
                message: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

fn parse_task_id(json: &Value) -> Result<String> {
    json.pointer("/data/taskId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            IllustratorError::InvalidResponse("Kie.ai response missing data.taskId".into())
        })
}

/// Fold a `recordInfo` payload into the task's state.
///
/// Kie reports `data.state` as `waiting`/`queuing`/`generating` while the
/// task runs, `success` with a JSON-encoded `resultJson` carrying the result
/// URLs, or `fail` with a `failMsg`.
fn apply_record_info(mut task: ProviderTask, json: &Value) -> ProviderTask {
    let state = json
        .pointer("/data/state")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match state {
        "success" => {
            let result_json = json
                .pointer("/data/resultJson")
                .and_then(|v| v.as_str())
                .unwrap_or("{}");
            let parsed: Value = serde_json::from_str(result_json).unwrap_or_default();
            match parsed.pointer("/resultUrls/0").and_then(|v| v.as_str()) {
                Some(url) => {
                    task.state = TaskState::Succeeded;
                    task.result_url = Some(url.to_string());
                }
                None => {
                    task.state = TaskState::Failed;
                    task.failure_reason =
                        Some("success report carried no result URL".to_string());
                }
            }
        }
        "fail" => {
            task.state = TaskState::Failed;
            task.failure_reason = Some(
                json.pointer("/data/failMsg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Kie.ai reported failure")
                    .to_string(),
            );
        }
        _ => {
            task.state = TaskState::Polling;
        }
    }
    task
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let json: Value = serde_json::from_str(
            r#"{"code": 200, "data": {"taskId": "task-abc-123"}}"#,
        )
        .unwrap();
        assert_eq!(parse_task_id(&json).unwrap(), "task-abc-123");
    }

    #[test]
    fn test_parse_task_id_missing() {
        let json: Value = serde_json::from_str(r#"{"code": 200, "data": {}}"#).unwrap();
        assert!(parse_task_id(&json).is_err());
    }

    #[test]
    fn test_record_info_still_generating() {
        let task = ProviderTask::polling("t1");
        let json: Value =
            serde_json::from_str(r#"{"data": {"state": "generating"}}"#).unwrap();
        let task = apply_record_info(task, &json);
        assert_eq!(task.state, TaskState::Polling);
        assert!(task.result_url.is_none());
    }

    #[test]
    fn test_record_info_success() {
        let task = ProviderTask::polling("t1");
        let json: Value = serde_json::from_str(
            r#"{"data": {"state": "success", "resultJson": "{\"resultUrls\": [\"https://cdn.kie.ai/out/1.png\"]}"}}"#,
        )
        .unwrap();
        let task = apply_record_info(task, &json);
        assert_eq!(task.state, TaskState::Succeeded);
        assert_eq!(
            task.result_url.as_deref(),
            Some("https://cdn.kie.ai/out/1.png")
        );
    }

    #[test]
    fn test_record_info_success_without_url_is_failure() {
        let task = ProviderTask::polling("t1");
        let json: Value = serde_json::from_str(
            r#"{"data": {"state": "success", "resultJson": "{\"resultUrls\": []}"}}"#,
        )
        .unwrap();
        let task = apply_record_info(task, &json);
        assert_eq!(task.state, TaskState::Failed);
        assert!(task.failure_reason.is_some());
    }

    #[test]
    fn test_record_info_failure_carries_reason() {
        let task = ProviderTask::polling("t1");
        let json: Value = serde_json::from_str(
            r#"{"data": {"state": "fail", "failMsg": "content policy"}}"#,
        )
        .unwrap();
        let task = apply_record_info(task, &json);
        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure_reason.as_deref(), Some("content policy"));
    }

    #[tokio::test]
    async fn test_download_requires_succeeded_state() {
        let adapter = KieAdapter::new(KieSettings::new("key"));
        let task = ProviderTask::polling("t1");
        let err = adapter.download(&task).await.unwrap_err();
        assert!(matches!(err, IllustratorError::TaskNotReady(TaskState::Polling)));
    }

    #[test]
    fn test_endpoint_trailing_slash_normalized() {
        let adapter = KieAdapter::new(KieSettings::new("key").endpoint("http://host:9900/"));
        assert_eq!(
            adapter.url("/api/v1/jobs/createTask"),
            "http://host:9900/api/v1/jobs/createTask"
        );
    }
}
