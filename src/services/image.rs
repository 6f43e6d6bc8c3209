use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::config::MediaConfig;

const IMAGE_SUBDIR: &str = "recipes/images";

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Parses `data:image/<type>;base64,<payload>`.
///
/// The mime type must be an `image/*` type with a known file extension.
pub fn decode_data_uri(input: &str) -> Result<DecodedImage> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| anyhow::anyhow!("Image must be a data URI"))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Image data URI has no payload"))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow::anyhow!("Image data URI must be base64 encoded"))?
        .to_ascii_lowercase();

    if !mime.starts_with("image/") {
        anyhow::bail!("Unsupported image type: {mime}");
    }

    let extension = mime_guess::get_mime_extensions_str(&mime)
        .and_then(|exts| exts.first())
        .map(|ext| if *ext == "jpe" { "jpg" } else { *ext })
        .ok_or_else(|| anyhow::anyhow!("Unsupported image type: {mime}"))?
        .to_string();

    let bytes = STANDARD
        .decode(payload.trim())
        .context("Image payload is not valid base64")?;

    if bytes.is_empty() {
        anyhow::bail!("Image payload is empty");
    }

    Ok(DecodedImage {
        mime,
        extension,
        bytes,
    })
}

/// Stores recipe images under the media root.
pub struct ImageService {
    root: PathBuf,
    url_prefix: String,
}

impl ImageService {
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Writes the image and returns its path relative to the media root.
    pub async fn save(&self, image: &DecodedImage) -> Result<String> {
        let dir = self.root.join(IMAGE_SUBDIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let relative = format!(
            "{IMAGE_SUBDIR}/{}.{}",
            uuid::Uuid::new_v4(),
            image.extension
        );
        let file_path = self.root.join(&relative);

        fs::write(&file_path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), mime = %image.mime, "Saved recipe image");

        Ok(relative)
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, relative: &str) {
        if relative.is_empty() || relative.contains("..") {
            return;
        }

        let file_path = self.root.join(relative);
        if let Err(e) = fs::remove_file(&file_path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %file_path.display(), error = %e, "Failed to remove recipe image");
        }
    }

    #[must_use]
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{relative}", self.url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png() {
        let decoded = decode_data_uri(&format!("data:image/png;base64,{PNG}")).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.extension, "png");
        assert_eq!(&decoded.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_decode_jpeg_extension() {
        let decoded = decode_data_uri(&format!("data:image/jpeg;base64,{PNG}")).unwrap();
        assert!(["jpg", "jpeg"].contains(&decoded.extension.as_str()));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_data_uri("not a uri").is_err());
        assert!(decode_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_uri("data:image/png,rawbytes").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_url_for() {
        let service = ImageService::new(&MediaConfig {
            root: "media".to_string(),
            url_prefix: "/media/".to_string(),
        });
        assert_eq!(
            service.url_for("recipes/images/a.png"),
            "/media/recipes/images/a.png"
        );
    }
}
