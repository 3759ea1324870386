//! Slide image storage.
//!
//! Uploaded files are checked twice: the extension of the original name and
//! the format sniffed from the decoded bytes must both be an accepted image
//! type, and they must agree. Accepted images are re-encoded into the image
//! directory under a salted name. Intermediate files live in
//! [`tempfile::NamedTempFile`]s and are removed on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use domain::SliderError;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::middleware::metrics::record_upload;

/// Generic failure message shown to the administrator.
pub const UPLOAD_FAILED: &str = "An error occurred during the image upload process.";

const FORMAT_NOT_ALLOWED: &str =
    "Image format not recognized, allowed formats are: .gif, .jpg, .jpeg, .png";

const SAMPLE_WIDTH: u32 = 1110;
const SAMPLE_HEIGHT: u32 = 340;

/// A file received in an admin form submission.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client supplied file name.
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Maps an accepted file extension to the image format it denotes.
fn format_for_extension(name: &str) -> Option<ImageFormat> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Sniffs the format from the file content and decodes it.
fn decode_checked(path: &Path, expected: ImageFormat) -> Result<DynamicImage, SliderError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| {
            error!(error = %e, "Failed to read uploaded image");
            SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
        })?;

    match reader.format() {
        Some(format) if format == expected => {}
        sniffed => {
            debug!(?sniffed, ?expected, "Upload content does not match its extension");
            return Err(SliderError::InvalidUpload(UPLOAD_FAILED.to_string()));
        }
    }

    reader.decode().map_err(|e| {
        debug!(error = %e, "Upload is not a decodable image");
        SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
    })
}

/// Re-encodes `image` into `dir` as `filename`, atomically.
fn write_image(
    dir: &Path,
    filename: &str,
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<(), SliderError> {
    let fail = |e: &dyn std::fmt::Display| {
        error!(error = %e, filename, "Failed to write slide image");
        SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| fail(&e))?;
    let encodable = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image.clone(),
    };
    let mut buffer = std::io::Cursor::new(Vec::new());
    encodable
        .write_to(&mut buffer, format)
        .map_err(|e| fail(&e))?;
    staged.write_all(buffer.get_ref()).map_err(|e| fail(&e))?;
    staged
        .persist(dir.join(filename))
        .map_err(|e| fail(&e.error))?;
    Ok(())
}

const SALT_LENGTH: usize = 40;

/// Whether `filename` carries the salt prefix given to uploads. Such names
/// are never reused for different content; sample images are not salted.
pub fn is_salted_name(filename: &str) -> bool {
    filename
        .split_once('_')
        .map(|(salt, rest)| {
            !rest.is_empty()
                && salt.len() == SALT_LENGTH
                && salt.chars().all(|c| c.is_ascii_hexdigit())
        })
        .unwrap_or(false)
}

/// Filesystem store for slide images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the image directory if it does not exist.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Path of a stored image. `None` for names that are not plain file names.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        shared::validation::is_file_name(filename).then(|| self.dir.join(filename))
    }

    /// Validates and stores one uploaded image, returning its stored name.
    pub async fn store_upload(&self, upload: UploadedImage) -> Result<String, SliderError> {
        let result = self.store_upload_inner(upload).await;
        record_upload(if result.is_ok() { "stored" } else { "rejected" });
        result
    }

    async fn store_upload_inner(&self, upload: UploadedImage) -> Result<String, SliderError> {
        if upload.bytes.len() > self.max_bytes {
            return Err(SliderError::InvalidUpload(format!(
                "Image is too large ({} kB). Maximum allowed: {} kB",
                upload.bytes.len() / 1024,
                self.max_bytes / 1024
            )));
        }

        let Some(format) = format_for_extension(&upload.original_name) else {
            return Err(SliderError::InvalidUpload(FORMAT_NOT_ALLOWED.to_string()));
        };

        let filename = format!("{}_{}", shared::crypto::upload_salt(), upload.original_name);
        if !shared::validation::is_file_name(&filename) {
            return Err(SliderError::InvalidUpload("Invalid filename.".to_string()));
        }

        let dir = self.dir.clone();
        let stored_name = filename.clone();
        tokio::task::spawn_blocking(move || -> Result<(), SliderError> {
            // Dropped (and deleted) on every return path
            let mut temp = NamedTempFile::new_in(&dir).map_err(|e| {
                error!(error = %e, "Failed to create temporary upload file");
                SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
            })?;
            temp.write_all(&upload.bytes).map_err(|e| {
                error!(error = %e, "Failed to write temporary upload file");
                SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
            })?;

            let image = decode_checked(temp.path(), format)?;
            write_image(&dir, &stored_name, &image, format)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Upload task failed");
            SliderError::InvalidUpload(UPLOAD_FAILED.to_string())
        })??;

        debug!(filename = %filename, "Stored slide image");
        Ok(filename)
    }

    /// Removes a stored image. Missing files are not an error.
    pub async fn remove(&self, filename: &str) -> std::io::Result<bool> {
        let Some(path) = self.path_of(filename) else {
            warn!(filename, "Refusing to remove image with unsafe name");
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_of(filename) {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Pixel size of a stored image, `None` when missing or unreadable.
    pub async fn dimensions(&self, filename: &str) -> Option<(u32, u32)> {
        let path = self.path_of(filename)?;
        tokio::task::spawn_blocking(move || image::image_dimensions(path).ok())
            .await
            .ok()
            .flatten()
    }

    /// Writes a placeholder banner for a seeded sample slide if it is missing.
    pub async fn ensure_sample_image(&self, filename: &str, index: i32) -> Result<(), SliderError> {
        if self.exists(filename).await {
            return Ok(());
        }
        let Some(format) = format_for_extension(filename) else {
            return Err(SliderError::InvalidUpload(FORMAT_NOT_ALLOWED.to_string()));
        };
        let dir = self.dir.clone();
        let name = filename.to_string();
        tokio::task::spawn_blocking(move || {
            let image = DynamicImage::ImageRgb8(sample_banner(index));
            write_image(&dir, &name, &image, format)
        })
        .await
        .map_err(|e| SliderError::InvalidUpload(e.to_string()))?
    }
}

/// Horizontal gradient whose hue depends on the sample index.
fn sample_banner(index: i32) -> RgbImage {
    let base: [u8; 3] = match index.rem_euclid(3) {
        1 => [52, 101, 164],
        2 => [78, 154, 6],
        _ => [204, 0, 0],
    };
    RgbImage::from_fn(SAMPLE_WIDTH, SAMPLE_HEIGHT, |x, _| {
        let shade = (x * 255 / SAMPLE_WIDTH) as u8 / 2;
        Rgb([
            base[0].saturating_add(shade),
            base[1].saturating_add(shade),
            base[2].saturating_add(shade),
        ])
    })
}
