//! Drafting collaborator seam: topic research and prose generation are
//! consumed as a black box behind this trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ArticleOutline;

/// The text-drafting collaborator.
///
/// The pipeline treats these four operations as mandatory: any failure here
/// aborts the whole generation run. How the text is produced — which models,
/// which prompts, which research sources — is entirely the implementor's
/// concern.
#[async_trait]
pub trait ArticleDrafter: Send + Sync {
    /// Gather background research for the topic.
    async fn research(&self, topic: &str) -> Result<String>;

    /// Produce a titled outline of headed sections.
    async fn generate_outline(
        &self,
        topic: &str,
        product_context: Option<&str>,
    ) -> Result<ArticleOutline>;

    /// Expand the outline into a marked-up article body.
    async fn generate_content(&self, outline: &ArticleOutline, research: &str) -> Result<String>;

    /// Summarize the article for search-engine metadata.
    async fn generate_meta_description(&self, title: &str, body: &str) -> Result<String>;
}
