//! Reading and writing JPEG, PNG and TIFF files.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::image_buf::ImageBuf;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn is_supported_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Pick the codec for a path from its extension.
pub fn format_for_path(path: &Path) -> Result<ImageFormat, CodecError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "tif" | "tiff" => Ok(ImageFormat::Tiff),
        _ => Err(CodecError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Decode a JPEG, PNG or TIFF file into an 8-bit RGB buffer.
///
/// Alpha is dropped and 16-bit sources are reduced to 8 bits.
pub fn load_image(path: &Path) -> Result<ImageBuf, CodecError> {
    info!(?path, "loading image file");
    let t0 = std::time::Instant::now();

    if !path.is_file() {
        return Err(CodecError::NotFound(path.to_path_buf()));
    }
    let format = format_for_path(path)?;

    let mut reader = ImageReader::open(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    reader.set_format(format);
    let img = reader.decode().map_err(|source| CodecError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        width = img.width(),
        height = img.height(),
        ?format,
        "image decode"
    );

    Ok(ImageBuf::from_rgb_image(img.into_rgb8()))
}

/// Encode `buf` to `path`, choosing the format from the extension.
pub fn save_image(path: &Path, buf: &ImageBuf, jpeg_quality: u8) -> Result<(), CodecError> {
    let format = format_for_path(path)?;
    let t0 = std::time::Instant::now();

    let file = File::create(path).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => JpegEncoder::new_with_quality(writer, jpeg_quality).write_image(
            &buf.data,
            buf.width,
            buf.height,
            ExtendedColorType::Rgb8,
        ),
        ImageFormat::Tiff => TiffEncoder::new(writer).write_image(
            &buf.data,
            buf.width,
            buf.height,
            ExtendedColorType::Rgb8,
        ),
        _ => PngEncoder::new(writer).write_image(
            &buf.data,
            buf.width,
            buf.height,
            ExtendedColorType::Rgb8,
        ),
    };
    result.map_err(|source| CodecError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    info!(?path, ?format, elapsed_ms = t0.elapsed().as_millis(), "image saved");
    Ok(())
}

/// File details shown next to a loaded image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    /// File name without extension.
    pub name: String,
    pub extension: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// `file_size` is 0, with a warning logged, if the file's metadata
    /// cannot be read.
    pub fn new(path: &Path, buf: &ImageBuf) -> Self {
        let file_size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(?path, "could not read file size: {e}");
                0
            }
        };
        Self {
            path: path.to_path_buf(),
            name: path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            extension: path
                .extension()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            file_size,
            width: buf.width,
            height: buf.height,
        }
    }

    /// `<dir>/<stem>.<source extension>`, so a result saves in the format it
    /// was loaded from.
    pub fn save_path(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension))
    }

    /// File size in kilobytes, rounded down.
    pub fn size_kb(&self) -> u64 {
        self.file_size / 1000
    }
}
