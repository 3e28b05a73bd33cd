use std::env;
use std::time::Duration;

use crate::types::{AspectRatio, OutputFormat, Resolution};

const KIE_DEFAULT_ENDPOINT: &str = "https://api.kie.ai";
const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Credentials and endpoint for the Kie.ai provider.
#[derive(Debug, Clone)]
pub struct KieSettings {
    pub api_key: String,
    pub endpoint: String,
}

impl KieSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: KIE_DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Credentials and endpoint for the OpenAI Images provider.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub endpoint: String,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: OPENAI_DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Poll loop tuning: fixed sleep interval and hard attempt ceiling.
///
/// The ceiling is a timeout contract — exceeding it always transitions the
/// task to `TimedOut`, never to an unbounded wait. Tests inject a zero
/// interval to assert exact attempt counts without wall-clock delay.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Provider credentials in preference order: Kie.ai is the cheap primary,
/// OpenAI the more expensive, more reliable fallback.
///
/// Read once at adapter construction and read-only afterwards, so settings
/// are safe to share across concurrent synthesis calls.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub kie: Option<KieSettings>,
    pub openai: Option<OpenAiSettings>,
    pub poll: PollConfig,
}

impl ProviderSettings {
    /// Read credentials from the environment: `KIE_API_KEY` /
    /// `OPENAI_API_KEY`, with optional `KIE_API_ENDPOINT` /
    /// `OPENAI_API_ENDPOINT` overrides. Unset or empty keys leave the
    /// provider ineligible.
    pub fn from_env() -> Self {
        let kie = non_empty_env("KIE_API_KEY").map(|key| {
            let settings = KieSettings::new(key);
            match non_empty_env("KIE_API_ENDPOINT") {
                Some(endpoint) => settings.endpoint(endpoint),
                None => settings,
            }
        });
        let openai = non_empty_env("OPENAI_API_KEY").map(|key| {
            let settings = OpenAiSettings::new(key);
            match non_empty_env("OPENAI_API_ENDPOINT") {
                Some(endpoint) => settings.endpoint(endpoint),
                None => settings,
            }
        });
        Self {
            kie,
            openai,
            poll: PollConfig::default(),
        }
    }

    pub fn kie(mut self, settings: KieSettings) -> Self {
        self.kie = Some(settings);
        self
    }

    pub fn openai(mut self, settings: OpenAiSettings) -> Self {
        self.openai = Some(settings);
        self
    }

    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Whether any provider is eligible at all.
    pub fn has_any(&self) -> bool {
        self.kie.is_some() || self.openai.is_some()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Options controlling the image stages of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on section images; only the first N headings in document
    /// order are eligible.
    pub max_section_images: usize,
    pub generate_thumbnail: bool,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_section_images: 3,
            generate_thumbnail: true,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl PipelineOptions {
    pub fn max_section_images(mut self, count: usize) -> Self {
        self.max_section_images = count;
        self
    }

    pub fn generate_thumbnail(mut self, enabled: bool) -> Self {
        self.generate_thumbnail = enabled;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_config_defaults() {
        let poll = PollConfig::default();
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.max_attempts, 60);
    }

    #[test]
    fn test_settings_builders() {
        let settings = ProviderSettings::default()
            .kie(KieSettings::new("k-key").endpoint("http://localhost:9900"))
            .openai(OpenAiSettings::new("o-key"));
        assert!(settings.has_any());
        assert_eq!(settings.kie.as_ref().unwrap().endpoint, "http://localhost:9900");
        assert_eq!(
            settings.openai.as_ref().unwrap().endpoint,
            OPENAI_DEFAULT_ENDPOINT
        );
    }

    #[test]
    fn test_empty_settings_have_no_provider() {
        assert!(!ProviderSettings::default().has_any());
    }

    #[test]
    fn test_pipeline_options_builder() {
        let options = PipelineOptions::default()
            .max_section_images(5)
            .generate_thumbnail(false)
            .output_format(OutputFormat::Jpeg);
        assert_eq!(options.max_section_images, 5);
        assert!(!options.generate_thumbnail);
        assert_eq!(options.output_format, OutputFormat::Jpeg);
    }
}
