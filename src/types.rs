use serde::{Deserialize, Serialize};

/// Aspect ratio of a synthesized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    /// 16:9, the usual blog cover and section illustration shape.
    #[default]
    Wide16x9,
    /// 1:1 square.
    Square1x1,
    /// 4:3 landscape.
    Standard4x3,
}

impl AspectRatio {
    /// Wire form used by task-based providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Square1x1 => "1:1",
            AspectRatio::Standard4x3 => "4:3",
        }
    }
}

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    OneK,
    TwoK,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
        }
    }
}

/// Binary format of a synthesized artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Immutable description of one image to synthesize.
///
/// # Example
/// ```
/// use article_illustrator::{AspectRatio, SynthesisRequest};
///
/// let request = SynthesisRequest::new("a lighthouse at dusk")
///     .aspect_ratio(AspectRatio::Square1x1);
/// assert_eq!(request.aspect_ratio.as_str(), "1:1");
/// ```
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
    /// Optional reference image for style/subject guidance. Providers that
    /// cannot consume one ignore it.
    pub reference_image_url: Option<String>,
}

impl SynthesisRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            output_format: OutputFormat::default(),
            reference_image_url: None,
        }
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

    pub fn reference_image(mut self, url: impl Into<String>) -> Self {
        self.reference_image_url = Some(url.into());
        self
    }
}

/// Lifecycle state of one provider-side synthesis task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

/// One remote synthesis task, owned by the adapter instance that created it.
#[derive(Debug, Clone)]
pub struct ProviderTask {
    pub id: String,
    pub state: TaskState,
    pub result_url: Option<String>,
    pub failure_reason: Option<String>,
}

impl ProviderTask {
    /// A freshly acknowledged task entering the poll phase.
    pub fn polling(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: TaskState::Polling,
            result_url: None,
            failure_reason: None,
        }
    }
}

/// How a coordinated synthesis attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// The first-preference provider produced the artifact.
    PrimarySuccess,
    /// A lower-preference provider produced the artifact after failover.
    FallbackSuccess,
    /// Every eligible provider failed; no usable artifact exists.
    Failed,
}

/// Final result of a synthesis attempt across all eligible providers.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub outcome: SynthesisOutcome,
    /// Artifact binary; zero-length when `outcome` is `Failed`.
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Name of the provider that produced the artifact.
    pub provider: Option<String>,
    /// Last provider error when `outcome` is `Failed`.
    pub error: Option<String>,
}

impl SynthesisResult {
    /// A `Failed`-outcome result carrying the last error and no bytes.
    pub fn failed(format: OutputFormat, error: impl Into<String>) -> Self {
        Self {
            outcome: SynthesisOutcome::Failed,
            bytes: Vec::new(),
            format,
            provider: None,
            error: Some(error.into()),
        }
    }

    /// Whether a usable artifact exists.
    pub fn is_usable(&self) -> bool {
        self.outcome != SynthesisOutcome::Failed && !self.bytes.is_empty()
    }
}

/// Article body after section-image insertion.
#[derive(Debug, Clone)]
pub struct EnrichedContent {
    pub final_text: String,
    pub inserted_count: usize,
    pub warnings: Vec<String>,
}

/// One headed section of a drafted outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    pub summary: String,
}

/// Titled outline returned by the drafting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleOutline {
    pub title: String,
    pub sections: Vec<OutlineSection>,
}

/// Finished article handed to the publishing collaborator.
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub title: String,
    /// Marked-up body with any section images already spliced in.
    pub body: String,
    pub meta_description: String,
    /// Cover artifact, absent when thumbnail synthesis failed or was off.
    pub thumbnail: Option<SynthesisResult>,
    pub section_image_count: usize,
    /// Degradations accumulated during the image stages.
    pub warnings: Vec<String>,
}

/// Stages of the article generation lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Research,
    Outline,
    Content,
    MetaDescription,
    Thumbnail,
    SectionImages,
    Done,
}

impl GenerationStage {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationStage::Research => "research",
            GenerationStage::Outline => "outline",
            GenerationStage::Content => "content",
            GenerationStage::MetaDescription => "meta_description",
            GenerationStage::Thumbnail => "thumbnail",
            GenerationStage::SectionImages => "section_images",
            GenerationStage::Done => "done",
        }
    }
}

/// Progress notification emitted at each stage boundary.
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    pub stage: GenerationStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_wire_form() {
        assert_eq!(AspectRatio::Wide16x9.as_str(), "16:9");
        assert_eq!(AspectRatio::Square1x1.as_str(), "1:1");
        assert_eq!(AspectRatio::Standard4x3.as_str(), "4:3");
    }

    #[test]
    fn test_output_format_metadata() {
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_request_builder() {
        let request = SynthesisRequest::new("a red fox")
            .aspect_ratio(AspectRatio::Square1x1)
            .resolution(Resolution::TwoK)
            .output_format(OutputFormat::Jpeg)
            .reference_image("https://example.org/ref.png");
        assert_eq!(request.prompt, "a red fox");
        assert_eq!(request.aspect_ratio, AspectRatio::Square1x1);
        assert_eq!(request.resolution, Resolution::TwoK);
        assert_eq!(request.output_format, OutputFormat::Jpeg);
        assert_eq!(
            request.reference_image_url.as_deref(),
            Some("https://example.org/ref.png")
        );
    }

    #[test]
    fn test_failed_result_is_not_usable() {
        let result = SynthesisResult::failed(OutputFormat::Png, "all providers exhausted");
        assert_eq!(result.outcome, SynthesisOutcome::Failed);
        assert!(result.bytes.is_empty());
        assert!(!result.is_usable());
    }

    #[test]
    fn test_polling_task_constructor() {
        let task = ProviderTask::polling("task-42");
        assert_eq!(task.id, "task-42");
        assert_eq!(task.state, TaskState::Polling);
        assert!(task.result_url.is_none());
        assert!(task.failure_reason.is_none());
    }
}
