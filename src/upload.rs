//! Publishing collaborator seam: persist artifacts to a media library, or
//! inline them when no library is available.

use async_trait::async_trait;
use base64::Engine;

use crate::error::Result;

/// URL of a persisted media asset.
#[derive(Debug, Clone)]
pub struct MediaUrl {
    pub source_url: String,
}

/// Upload capability of the publishing target (a CMS media library).
///
/// Implementations live outside this crate. When the mutator is given no
/// uploader it embeds artifacts as inline `data:` URLs instead.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload_media(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<MediaUrl>;
}

/// Inline `data:` URL for environments without a media library.
pub fn data_url(bytes: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_shape() {
        let url = data_url(b"png-bytes", "image/png");
        assert!(url.starts_with("data:image/png;base64,"));
        let payload = url.split_once("base64,").unwrap().1;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(decoded, b"png-bytes");
    }

    #[test]
    fn test_data_url_empty_bytes() {
        assert_eq!(data_url(b"", "image/jpeg"), "data:image/jpeg;base64,");
    }
}
