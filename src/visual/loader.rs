use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::Client;
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::error::{NewsReelError, Result, VisualError};
use crate::ffmpeg;
use crate::visual::types::{scaled_width, VisualSource};

/// Downloads still images and normalises them to the output height
pub struct ImageDownloader {
    client: Client,
    target_height: u32,
}

impl ImageDownloader {
    pub fn new(client: Client, target_height: u32) -> Self {
        Self { client, target_height }
    }

    /// Fetch `url`, resize it and write it into `dest_dir` as a PNG
    #[instrument(level = "info", skip(self, dest_dir), fields(%url))]
    pub async fn download(&self, url: &str, dest_dir: &Path) -> Result<VisualSource> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Image download rejected");
            return Err(VisualError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            }.into());
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Downloaded image");

        let dest = dest_dir.join(format!("image_{}.png", uuid::Uuid::new_v4().simple()));
        let origin = url.to_string();
        let target_height = self.target_height;

        let source = task::spawn_blocking(move || prepare_still(&bytes, &origin, target_height, dest))
            .await
            .map_err(|e| NewsReelError::generic(format!("Image worker failed: {}", e)))??;

        info!(resolution = ?source.resolution(), "Prepared still image");
        Ok(source)
    }
}

/// Decode image bytes, resize to `target_height` and save as PNG at `dest`
pub fn prepare_still(bytes: &[u8], origin: &str, target_height: u32, dest: PathBuf) -> Result<VisualSource> {
    let image = image::load_from_memory(bytes).map_err(|e| VisualError::DecodeFailed {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    let resized = resize_to_height(&image, target_height);
    let (width, height) = resized.dimensions();

    resized.to_rgb8().save(&dest).map_err(|e| VisualError::DecodeFailed {
        origin: origin.to_string(),
        reason: format!("Failed to save {}: {}", dest.display(), e),
    })?;

    Ok(VisualSource::StillImage { path: dest, width, height })
}

/// Resize with a high-quality Lanczos3 filter, keeping the aspect ratio
fn resize_to_height(image: &DynamicImage, target_height: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let target_width = scaled_width(width, height, target_height);

    if width == target_width && height == target_height {
        return image.clone();
    }

    image.resize_exact(target_width, target_height, FilterType::Lanczos3)
}

/// Opens local background assets
pub struct VisualLoader;

impl VisualLoader {
    /// Open a background video and probe its duration and size
    pub async fn open_background_video<P: AsRef<Path>>(path: P) -> Result<VisualSource> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(VisualError::MissingAsset {
                path: path.display().to_string(),
            }.into());
        }

        let probe = ffmpeg::probe_video(path).await?;
        info!(path = %path.display(), duration = probe.duration,
              width = probe.width, height = probe.height, "Opened background video");

        Ok(VisualSource::BackgroundVideo {
            path: path.to_path_buf(),
            duration: probe.duration,
            width: probe.width,
            height: probe.height,
        })
    }
}
