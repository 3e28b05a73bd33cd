//! Content mutation: splice synthesized image blocks into the article body
//! without corrupting its structure as insertions accumulate.

use crate::error::{IllustratorError, Result};
use crate::headings::{strip_tags, HeadingRef, RE_HEADING};
use crate::types::{EnrichedContent, SynthesisResult};
use crate::upload::{data_url, MediaUploader};

/// Warning emitted when the body has no headings at all.
pub(crate) const NO_HEADERS_WARNING: &str = "No headers found for section images";

/// Insert one artifact after each of the first `max_images` headings.
///
/// Eligible headings are processed in reverse document order: splicing at an
/// earlier offset shifts everything after it, so working back-to-front keeps
/// every pending insertion point upstream of all completed splices.
///
/// Offsets captured at extraction time are a snapshot of the original text.
/// Each insertion re-locates its heading in the *current* text by stripped
/// literal text, never by stale offset.
///
/// Per-heading failures — a `Failed`-outcome artifact, an upload error, a
/// relocation miss — are recorded as warnings and never abort the batch.
pub async fn insert_section_images(
    original: &str,
    headings: &[HeadingRef],
    artifacts: &[SynthesisResult],
    max_images: usize,
    uploader: Option<&dyn MediaUploader>,
) -> EnrichedContent {
    if headings.is_empty() {
        return EnrichedContent {
            final_text: original.to_string(),
            inserted_count: 0,
            warnings: vec![NO_HEADERS_WARNING.to_string()],
        };
    }

    let eligible = headings.len().min(max_images).min(artifacts.len());
    let mut text = original.to_string();
    let mut warnings = Vec::new();
    let mut inserted = 0;

    for index in (0..eligible).rev() {
        let heading = &headings[index];
        let artifact = &artifacts[index];

        if !artifact.is_usable() {
            warnings.push(format!(
                "Failed to generate image for section: {}",
                heading.text
            ));
            continue;
        }

        match embed_after_heading(&mut text, heading, artifact, uploader).await {
            Ok(()) => inserted += 1,
            Err(e) => warnings.push(format!(
                "Error processing section \"{}\": {}",
                heading.text, e
            )),
        }
    }

    // Reverse-order processing pushed warnings back-to-front; surface them
    // in document order.
    warnings.reverse();

    EnrichedContent {
        final_text: text,
        inserted_count: inserted,
        warnings,
    }
}

/// Re-locate `heading` in the current text and splice a figure block
/// immediately after its closing tag.
async fn embed_after_heading(
    text: &mut String,
    heading: &HeadingRef,
    artifact: &SynthesisResult,
    uploader: Option<&dyn MediaUploader>,
) -> Result<()> {
    let insert_at = locate_heading_end(text, heading).ok_or_else(|| {
        IllustratorError::InvalidResponse("heading no longer present in document".into())
    })?;

    let src = match uploader {
        Some(uploader) => {
            let filename = format!("{}.{}", slugify(&heading.text), artifact.format.extension());
            uploader
                .upload_media(&artifact.bytes, &filename, artifact.format.mime_type())
                .await?
                .source_url
        }
        None => data_url(&artifact.bytes, artifact.format.mime_type()),
    };

    text.insert_str(insert_at, &figure_block(&src, &heading.text));
    Ok(())
}

/// Byte offset just past the closing tag of the first heading block in
/// `text` whose level and stripped text match `heading`.
///
/// Duplicate heading text resolves to the first occurrence, which can
/// misplace an artifact when an earlier duplicate exists; the ambiguity is
/// logged rather than silently accepted.
fn locate_heading_end(text: &str, heading: &HeadingRef) -> Option<usize> {
    let mut first = None;
    let mut occurrences = 0;
    for caps in RE_HEADING.captures_iter(text) {
        let level: u8 = caps[1].parse().unwrap_or(2);
        if level != heading.level || strip_tags(&caps[2]) != heading.text {
            continue;
        }
        occurrences += 1;
        if first.is_none() {
            first = caps.get(0).map(|m| m.end());
        }
    }
    if occurrences > 1 {
        tracing::warn!(
            heading = heading.text.as_str(),
            occurrences,
            "duplicate heading text; image placed after the first occurrence"
        );
    }
    first
}

/// Self-contained captioned image block.
fn figure_block(src: &str, caption: &str) -> String {
    let escaped = escape_html(caption);
    format!(
        "\n<figure class=\"section-image\"><img src=\"{}\" alt=\"{}\" /><figcaption>{}</figcaption></figure>",
        src, escaped, escaped
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Lowercased, hyphen-separated form of a heading for artifact filenames.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headings::extract_headings;
    use crate::types::{OutputFormat, SynthesisOutcome};

    fn ok_artifact(bytes: &[u8]) -> SynthesisResult {
        SynthesisResult {
            outcome: SynthesisOutcome::PrimarySuccess,
            bytes: bytes.to_vec(),
            format: OutputFormat::Png,
            provider: Some("kie".to_string()),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_no_headings_is_noop_with_single_warning() {
        let text = "<p>no structure here</p>";
        let enriched = insert_section_images(text, &[], &[], 3, None).await;
        assert_eq!(enriched.final_text, text);
        assert_eq!(enriched.inserted_count, 0);
        assert_eq!(enriched.warnings, vec![NO_HEADERS_WARNING.to_string()]);
    }

    #[tokio::test]
    async fn test_insert_after_single_heading() {
        let text = "<h2>One</h2><p>x</p>";
        let headings = extract_headings(text);
        let artifacts = vec![ok_artifact(b"img")];
        let enriched = insert_section_images(text, &headings, &artifacts, 3, None).await;
        assert_eq!(enriched.inserted_count, 1);
        assert!(enriched.warnings.is_empty());
        assert!(enriched
            .final_text
            .starts_with("<h2>One</h2>\n<figure class=\"section-image\">"));
        assert!(enriched.final_text.ends_with("</figure><p>x</p>"));
    }

    #[tokio::test]
    async fn test_data_url_fallback_without_uploader() {
        let text = "<h2>One</h2><p>x</p>";
        let headings = extract_headings(text);
        let artifacts = vec![ok_artifact(b"img")];
        let enriched = insert_section_images(text, &headings, &artifacts, 1, None).await;
        assert!(enriched.final_text.contains("src=\"data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_heading_missing_from_mutated_text_warns_and_continues() {
        let text = "<h2>One</h2><p>x</p><h2>Two</h2><p>y</p>";
        let headings = extract_headings("<h2>Gone</h2><h2>Two</h2>");
        let artifacts = vec![ok_artifact(b"a"), ok_artifact(b"b")];
        let enriched = insert_section_images(text, &headings, &artifacts, 2, None).await;
        assert_eq!(enriched.inserted_count, 1);
        assert_eq!(enriched.warnings.len(), 1);
        assert!(enriched.warnings[0].starts_with("Error processing section \"Gone\":"));
    }

    #[test]
    fn test_locate_matches_level_as_well_as_text() {
        let text = "<h3>Same</h3><h2>Same</h2>";
        let headings = extract_headings(text);
        let h2 = headings.iter().find(|h| h.level == 2).unwrap();
        let end = locate_heading_end(text, h2).unwrap();
        assert_eq!(&text[..end], "<h3>Same</h3><h2>Same</h2>");
    }

    #[test]
    fn test_locate_duplicate_resolves_to_first() {
        let text = "<h2>Dup</h2><p>a</p><h2>Dup</h2><p>b</p>";
        let headings = extract_headings(text);
        let end = locate_heading_end(text, &headings[1]).unwrap();
        assert_eq!(&text[..end], "<h2>Dup</h2>");
    }

    #[test]
    fn test_figure_block_escapes_caption() {
        let block = figure_block("https://cdn/x.png", "Ben & Jerry's \"best\"");
        assert!(block.contains("alt=\"Ben &amp; Jerry's &quot;best&quot;\""));
        assert!(!block.contains("alt=\"Ben & "));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Big Idea"), "the-big-idea");
        assert_eq!(slugify("  Rust: 2024?  "), "rust-2024");
        assert_eq!(slugify("™∆"), "section");
    }
}
