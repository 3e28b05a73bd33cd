//! # article-illustrator
//!
//! Provider-failover image synthesis and positional image insertion for
//! machine-drafted articles.
//!
//! Given a drafted article body, this library obtains synthesized imagery
//! from interchangeable remote providers — tolerating outages and timeouts
//! through transparent failover — and splices each artifact into the markup
//! immediately after its section heading without corrupting the rest of the
//! document, even as accumulated insertions shift text offsets.
//!
//! ## Features
//!
//! - **Provider failover** — adapters for task-based (Kie.ai) and
//!   synchronous (OpenAI Images) backends behind one contract; on any stage
//!   failure the coordinator restarts the whole submit → poll → download
//!   sequence on the next provider
//! - **Bounded polling** — fixed sleep interval with a hard attempt
//!   ceiling, so a hung provider can never stall a run
//! - **Offset-safe insertion** — headings are re-located by literal text in
//!   the current document and processed in reverse order, keeping every
//!   pending insertion point valid
//! - **Best-effort imagery** — text is the deliverable; every image failure
//!   degrades to a warning instead of aborting the run
//!
//! ## Quick Start
//!
//! ```no_run
//! use article_illustrator::{
//!     ArticleDrafter, ArticleOutline, ArticlePipeline, OutlineSection, PipelineOptions,
//!     ProviderSettings, Result, SynthesisCoordinator,
//! };
//!
//! struct MyDrafter;
//!
//! #[async_trait::async_trait]
//! impl ArticleDrafter for MyDrafter {
//!     async fn research(&self, _topic: &str) -> Result<String> {
//!         Ok("background notes".to_string())
//!     }
//!
//!     async fn generate_outline(
//!         &self,
//!         topic: &str,
//!         _product_context: Option<&str>,
//!     ) -> Result<ArticleOutline> {
//!         Ok(ArticleOutline {
//!             title: topic.to_string(),
//!             sections: vec![OutlineSection {
//!                 heading: "Introduction".to_string(),
//!                 summary: String::new(),
//!             }],
//!         })
//!     }
//!
//!     async fn generate_content(&self, _: &ArticleOutline, _: &str) -> Result<String> {
//!         Ok("<h2>Introduction</h2><p>Hello.</p>".to_string())
//!     }
//!
//!     async fn generate_meta_description(&self, _: &str, _: &str) -> Result<String> {
//!         Ok("A short description.".to_string())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let coordinator = SynthesisCoordinator::from_settings(&ProviderSettings::from_env());
//!
//! let pipeline = ArticlePipeline::builder()
//!     .drafter(MyDrafter)
//!     .coordinator(coordinator)
//!     .options(PipelineOptions::default().max_section_images(3))
//!     .build()?;
//!
//! let article = pipeline.generate("rust error handling patterns").await?;
//! println!("{} ({} section images)", article.title, article.section_image_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod drafting;
pub mod error;
pub mod headings;
pub mod mutator;
pub mod pipeline;
pub mod provider;
pub mod types;
pub mod upload;

pub use config::{KieSettings, OpenAiSettings, PipelineOptions, PollConfig, ProviderSettings};
pub use coordinator::SynthesisCoordinator;
pub use drafting::ArticleDrafter;
pub use error::{IllustratorError, Result};
pub use headings::{extract_headings, HeadingRef};
pub use mutator::insert_section_images;
pub use pipeline::{ArticlePipeline, ArticlePipelineBuilder};
pub use provider::{KieAdapter, OpenAiAdapter, ProviderAdapter};
pub use types::{
    ArticleOutline, AspectRatio, EnrichedContent, GeneratedArticle, GenerationStage,
    OutlineSection, OutputFormat, PipelineProgress, ProviderTask, Resolution, SynthesisOutcome,
    SynthesisRequest, SynthesisResult, TaskState,
};
pub use upload::{data_url, MediaUploader, MediaUrl};
