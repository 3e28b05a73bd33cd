//! Pipeline orchestration: draft → thumbnail → section images → assembly.
//!
//! Text is the deliverable, images are an enhancement: the four text stages
//! are fatal on failure, the two image stages only degrade the result.

use futures::stream::{self, StreamExt};

use crate::config::PipelineOptions;
use crate::coordinator::SynthesisCoordinator;
use crate::drafting::ArticleDrafter;
use crate::error::{IllustratorError, Result};
use crate::headings::{extract_headings, HeadingRef};
use crate::mutator::insert_section_images;
use crate::types::{
    GeneratedArticle, GenerationStage, PipelineProgress, SynthesisRequest, SynthesisResult,
};
use crate::upload::MediaUploader;

/// Width of the section-image synthesis window. Providers rate-limit
/// aggressively, so this stays small.
const SYNTHESIS_CONCURRENCY: usize = 2;

/// Orchestrates the full article generation lifecycle for one topic.
///
/// Stages run in order: `Research → Outline → Content → MetaDescription →
/// Thumbnail → SectionImages → Done`. Each stage's output feeds the next;
/// there is no stage overlap within a run.
pub struct ArticlePipeline {
    drafter: Box<dyn ArticleDrafter>,
    coordinator: SynthesisCoordinator,
    uploader: Option<Box<dyn MediaUploader>>,
    options: PipelineOptions,
    product_context: Option<String>,
}

impl std::fmt::Debug for ArticlePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticlePipeline")
            .field("options", &self.options)
            .field("product_context", &self.product_context)
            .finish_non_exhaustive()
    }
}

impl ArticlePipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ArticlePipelineBuilder {
        ArticlePipelineBuilder::new()
    }

    /// Run the full generation lifecycle for one topic.
    pub async fn generate(&self, topic: &str) -> Result<GeneratedArticle> {
        self.generate_with_progress(topic, |_| {}).await
    }

    /// Run the lifecycle with a progress callback invoked at each stage
    /// boundary.
    ///
    /// A finished article is always returned if text generation succeeded;
    /// image degradations are reported through the article's `thumbnail`,
    /// `section_image_count`, and `warnings` fields.
    pub async fn generate_with_progress<F>(
        &self,
        topic: &str,
        mut on_progress: F,
    ) -> Result<GeneratedArticle>
    where
        F: FnMut(PipelineProgress),
    {
        on_progress(PipelineProgress {
            stage: GenerationStage::Research,
        });
        let research = self
            .drafter
            .research(topic)
            .await
            .map_err(|e| stage_failed(GenerationStage::Research, e))?;

        on_progress(PipelineProgress {
            stage: GenerationStage::Outline,
        });
        let outline = self
            .drafter
            .generate_outline(topic, self.product_context.as_deref())
            .await
            .map_err(|e| stage_failed(GenerationStage::Outline, e))?;

        on_progress(PipelineProgress {
            stage: GenerationStage::Content,
        });
        let body = self
            .drafter
            .generate_content(&outline, &research)
            .await
            .map_err(|e| stage_failed(GenerationStage::Content, e))?;

        on_progress(PipelineProgress {
            stage: GenerationStage::MetaDescription,
        });
        let meta_description = self
            .drafter
            .generate_meta_description(&outline.title, &body)
            .await
            .map_err(|e| stage_failed(GenerationStage::MetaDescription, e))?;

        on_progress(PipelineProgress {
            stage: GenerationStage::Thumbnail,
        });
        let thumbnail = if self.options.generate_thumbnail {
            self.synthesize_thumbnail(&outline.title).await
        } else {
            None
        };

        on_progress(PipelineProgress {
            stage: GenerationStage::SectionImages,
        });
        let (body, section_image_count, warnings) = self.illustrate_sections(&body).await;

        on_progress(PipelineProgress {
            stage: GenerationStage::Done,
        });
        Ok(GeneratedArticle {
            title: outline.title,
            body,
            meta_description,
            thumbnail,
            section_image_count,
            warnings,
        })
    }

    /// Best-effort cover synthesis; a failure is logged, never fatal.
    async fn synthesize_thumbnail(&self, title: &str) -> Option<SynthesisResult> {
        let request = self.request_for(thumbnail_prompt(title));
        let result = self.coordinator.synthesize(&request).await;
        if result.is_usable() {
            Some(result)
        } else {
            tracing::warn!(
                error = result.error.as_deref().unwrap_or("unknown"),
                "thumbnail synthesis failed; continuing without one"
            );
            None
        }
    }

    /// Synthesize artifacts for the leading sections of `body` and splice
    /// them in. Synthesis runs with a small concurrency window; insertion
    /// stays sequential and reverse-ordered.
    async fn illustrate_sections(&self, body: &str) -> (String, usize, Vec<String>) {
        if self.options.max_section_images == 0 {
            return (body.to_string(), 0, Vec::new());
        }

        let headings = extract_headings(body);
        let eligible = headings.len().min(self.options.max_section_images);
        let artifacts: Vec<SynthesisResult> = stream::iter(headings.iter().take(eligible))
            .map(|heading| {
                let request = self.request_for(section_prompt(heading));
                async move { self.coordinator.synthesize(&request).await }
            })
            .buffered(SYNTHESIS_CONCURRENCY)
            .collect()
            .await;

        let enriched = insert_section_images(
            body,
            &headings,
            &artifacts,
            self.options.max_section_images,
            self.uploader.as_deref(),
        )
        .await;
        (
            enriched.final_text,
            enriched.inserted_count,
            enriched.warnings,
        )
    }

    fn request_for(&self, prompt: String) -> SynthesisRequest {
        SynthesisRequest::new(prompt)
            .aspect_ratio(self.options.aspect_ratio)
            .resolution(self.options.resolution)
            .output_format(self.options.output_format)
    }
}

fn stage_failed(stage: GenerationStage, error: IllustratorError) -> IllustratorError {
    IllustratorError::StageFailed {
        stage: stage.name().to_string(),
        message: error.to_string(),
    }
}

/// Minimal prompt assembly; prompt design beyond this lives with the
/// caller's drafter, not here.
fn thumbnail_prompt(title: &str) -> String {
    format!(
        "Blog cover illustration for an article titled \"{}\". Clean editorial style, no text or lettering.",
        title
    )
}

fn section_prompt(heading: &HeadingRef) -> String {
    let mut prompt = format!(
        "Editorial illustration for an article section titled \"{}\".",
        heading.text
    );
    if !heading.context.is_empty() {
        prompt.push_str(" The section covers: ");
        prompt.push_str(&heading.context);
        prompt.push('.');
    }
    prompt.push_str(" No text or lettering.");
    prompt
}

/// Builder for [`ArticlePipeline`].
pub struct ArticlePipelineBuilder {
    drafter: Option<Box<dyn ArticleDrafter>>,
    coordinator: Option<SynthesisCoordinator>,
    uploader: Option<Box<dyn MediaUploader>>,
    options: PipelineOptions,
    product_context: Option<String>,
}

impl ArticlePipelineBuilder {
    pub fn new() -> Self {
        Self {
            drafter: None,
            coordinator: None,
            uploader: None,
            options: PipelineOptions::default(),
            product_context: None,
        }
    }

    /// Set the text-drafting collaborator (required).
    pub fn drafter(mut self, drafter: impl ArticleDrafter + 'static) -> Self {
        self.drafter = Some(Box::new(drafter));
        self
    }

    /// Set the synthesis coordinator (required).
    pub fn coordinator(mut self, coordinator: SynthesisCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Set the publishing target's media uploader. Without one, artifacts
    /// are embedded as inline data URLs.
    pub fn uploader(mut self, uploader: impl MediaUploader + 'static) -> Self {
        self.uploader = Some(Box::new(uploader));
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Product/brand context passed through to outline generation.
    pub fn product_context(mut self, context: impl Into<String>) -> Self {
        self.product_context = Some(context.into());
        self
    }

    /// Build the pipeline, validating configuration.
    pub fn build(self) -> Result<ArticlePipeline> {
        let drafter = self.drafter.ok_or_else(|| {
            IllustratorError::InvalidConfig("pipeline requires a drafter".to_string())
        })?;
        let coordinator = self.coordinator.ok_or_else(|| {
            IllustratorError::InvalidConfig("pipeline requires a synthesis coordinator".to_string())
        })?;
        Ok(ArticlePipeline {
            drafter,
            coordinator,
            uploader: self.uploader,
            options: self.options,
            product_context: self.product_context,
        })
    }
}

impl Default for ArticlePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
