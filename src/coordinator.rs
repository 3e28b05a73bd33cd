//! Image synthesis coordination: drive provider adapters through the full
//! submit → poll → download lifecycle with transparent failover.

use crate::config::{PollConfig, ProviderSettings};
use crate::error::{IllustratorError, Result};
use crate::provider::{KieAdapter, OpenAiAdapter, ProviderAdapter};
use crate::types::{SynthesisOutcome, SynthesisRequest, SynthesisResult, TaskState};

/// Coordinates synthesis across a preference-ordered list of providers.
///
/// Provider order is a cost/reliability tradeoff: the cheap primary is tried
/// first, the more reliable fallback only when it fails. Failure at any
/// stage — rejected submission, failed task, timeout, or download error —
/// restarts the entire sequence on the next provider. The coordinator never
/// returns an error for ordinary provider failure; exhaustion surfaces as a
/// `Failed`-outcome [`SynthesisResult`].
pub struct SynthesisCoordinator {
    providers: Vec<Box<dyn ProviderAdapter>>,
    poll: PollConfig,
}

impl SynthesisCoordinator {
    /// Build a coordinator from provider settings.
    ///
    /// Only providers with credentials are constructed, in preference order:
    /// Kie.ai first, OpenAI second.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut providers: Vec<Box<dyn ProviderAdapter>> = Vec::new();
        if let Some(kie) = &settings.kie {
            providers.push(Box::new(KieAdapter::new(kie.clone())));
        }
        if let Some(openai) = &settings.openai {
            providers.push(Box::new(OpenAiAdapter::new(openai.clone())));
        }
        Self {
            providers,
            poll: settings.poll,
        }
    }

    /// Build a coordinator from explicit adapters (custom backends, tests).
    pub fn new(providers: Vec<Box<dyn ProviderAdapter>>, poll: PollConfig) -> Self {
        Self { providers, poll }
    }

    /// Number of eligible providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Synthesize one image, failing over across providers.
    ///
    /// With zero eligible providers this fails immediately without any
    /// network I/O.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisResult {
        if self.providers.is_empty() {
            tracing::warn!("image synthesis requested with no providers configured");
            return SynthesisResult::failed(
                request.output_format,
                IllustratorError::ProviderUnavailable.to_string(),
            );
        }

        let mut last_error = String::new();
        for (index, provider) in self.providers.iter().enumerate() {
            match self.run_provider(provider.as_ref(), request).await {
                Ok(bytes) => {
                    let outcome = if index == 0 {
                        SynthesisOutcome::PrimarySuccess
                    } else {
                        tracing::debug!(
                            provider = provider.name(),
                            "synthesis succeeded via fallback provider"
                        );
                        SynthesisOutcome::FallbackSuccess
                    };
                    return SynthesisResult {
                        outcome,
                        bytes,
                        format: request.output_format,
                        provider: Some(provider.name().to_string()),
                        error: None,
                    };
                }
                Err(e) => {
                    // The abandoned remote task keeps running server-side;
                    // we simply stop polling it.
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    last_error = e.to_string();
                }
            }
        }

        SynthesisResult::failed(request.output_format, last_error)
    }

    /// Drive one adapter through the full task lifecycle. Failover restarts
    /// this sequence from scratch on a fresh task; it never resumes.
    async fn run_provider(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &SynthesisRequest,
    ) -> Result<Vec<u8>> {
        let mut task = adapter.submit(request).await?;

        let mut attempts: u32 = 0;
        while matches!(task.state, TaskState::Created | TaskState::Polling) {
            if attempts >= self.poll.max_attempts {
                return Err(IllustratorError::TaskTimedOut {
                    provider: adapter.name().to_string(),
                    attempts,
                });
            }
            tokio::time::sleep(self.poll.interval).await;
            task = adapter.poll(task).await?;
            attempts += 1;
        }

        match task.state {
            TaskState::Succeeded => adapter.download(&task).await,
            TaskState::Failed => Err(IllustratorError::TaskFailed {
                provider: adapter.name().to_string(),
                reason: task
                    .failure_reason
                    .unwrap_or_else(|| "unspecified provider failure".to_string()),
            }),
            TaskState::TimedOut => Err(IllustratorError::TaskTimedOut {
                provider: adapter.name().to_string(),
                attempts,
            }),
            state => Err(IllustratorError::InvalidResponse(format!(
                "task left in non-terminal state {:?}",
                state
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputFormat;

    #[tokio::test]
    async fn test_no_providers_fails_without_io() {
        let coordinator = SynthesisCoordinator::new(Vec::new(), PollConfig::default());
        let result = coordinator
            .synthesize(&SynthesisRequest::new("anything"))
            .await;
        assert_eq!(result.outcome, SynthesisOutcome::Failed);
        assert!(result.bytes.is_empty());
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("no image synthesis provider"));
    }

    #[tokio::test]
    async fn test_from_settings_eligibility() {
        use crate::config::{KieSettings, OpenAiSettings};

        let none = SynthesisCoordinator::from_settings(&ProviderSettings::default());
        assert_eq!(none.provider_count(), 0);

        let both = SynthesisCoordinator::from_settings(
            &ProviderSettings::default()
                .kie(KieSettings::new("k"))
                .openai(OpenAiSettings::new("o")),
        );
        assert_eq!(both.provider_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_result_preserves_format() {
        let coordinator = SynthesisCoordinator::new(Vec::new(), PollConfig::default());
        let result = coordinator
            .synthesize(&SynthesisRequest::new("x").output_format(OutputFormat::Jpeg))
            .await;
        assert_eq!(result.format, OutputFormat::Jpeg);
    }
}
