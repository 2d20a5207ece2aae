use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ImageSettings;
use crate::error::TransferError;
use crate::store::relative_key;

const DEFAULT_EXTENSION: &str = ".jpg";

/// Moves one image somewhere the records can point at and returns the new
/// reference. Callers go through `ImageStore::resolve`, which caches the
/// result and swallows errors.
pub trait ImageTransfer: Send + Sync {
    fn transfer(&self, reference: &str) -> Result<String, TransferError>;
}

/// Leaves every reference as it is.
pub struct Passthrough;

impl ImageTransfer for Passthrough {
    fn transfer(&self, reference: &str) -> Result<String, TransferError> {
        Ok(reference.to_string())
    }
}

/// Downloads URLs / copies local files into `target_dir` under a fresh
/// name, then recompresses the copy.
pub struct FileTransfer {
    client: Client,
    base_dir: PathBuf,
    target_dir: PathBuf,
    public_prefix: String,
    jpeg_quality: u8,
}

impl FileTransfer {
    pub fn new(settings: &ImageSettings, base_dir: &Path) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(FileTransfer {
            client,
            base_dir: base_dir.to_path_buf(),
            target_dir: base_dir.join(&settings.target_dir),
            public_prefix: settings.public_prefix.clone(),
            jpeg_quality: settings.jpeg_quality,
        })
    }

    fn fetch(&self, reference: &str, dest: &Path) -> Result<(), TransferError> {
        if is_remote(reference) {
            let response = self.client.get(reference).send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransferError::Status(status.as_u16()));
            }
            let bytes = response.bytes()?;
            fs::write(dest, &bytes)?;
        } else {
            fs::copy(self.base_dir.join(reference), dest)?;
        }
        Ok(())
    }
}

impl ImageTransfer for FileTransfer {
    fn transfer(&self, reference: &str) -> Result<String, TransferError> {
        let file_name = format!("{}{}", Uuid::new_v4(), extension_for(reference));
        let dest = self.target_dir.join(&file_name);

        fs::create_dir_all(&self.target_dir)?;
        if let Err(e) = self.fetch(reference, &dest) {
            // don't leave a half-written file behind
            let _ = fs::remove_file(&dest);
            return Err(e);
        }

        if let Err(e) = recompress(&dest, self.jpeg_quality) {
            warn!(path = %dest.display(), error = %e, "recompression failed, keeping copy as-is");
        }

        debug!(reference, dest = %dest.display(), "image stored");
        Ok(format!(
            "{}{}",
            self.public_prefix,
            relative_key(&self.base_dir, &dest)
        ))
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Extension (with the dot) of a path or of a URL's path component.
fn extension_for(reference: &str) -> String {
    let path = if is_remote(reference) {
        Url::parse(reference)
            .map(|u| u.path().to_string())
            .unwrap_or_default()
    } else {
        reference.to_string()
    };

    Path::new(&path)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Re-encode JPEGs at `quality` (alpha dropped); re-save other formats.
fn recompress(path: &Path, quality: u8) -> image::ImageResult<()> {
    let img = image::open(path)?;
    let is_jpeg = path
        .extension()
        .map(|e| matches!(e.to_ascii_lowercase().to_str(), Some("jpg" | "jpeg")))
        .unwrap_or(false);

    if is_jpeg {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = JpegEncoder::new_with_quality(writer, quality);
        encoder.encode_image(&img.to_rgb8())?;
    } else {
        img.save(path)?;
    }
    Ok(())
}
