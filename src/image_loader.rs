// Image loading module
// Reads an image file from disk and decodes it into RGBA pixels ready for
// texture upload

use image::DynamicImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decoded image data ready for display
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Raw RGBA pixel data (4 bytes per pixel)
    pub rgba_data: Vec<u8>,
}

/// Why an image file could not be turned into pixels
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read image file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Load and decode the image at `path`.
///
/// An image with a side longer than `max_dim` is downscaled to fit it, so the
/// result can always be uploaded as a single GPU texture.
pub fn load_image(path: &Path, max_dim: u32) -> Result<ImageData, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let img = load_from_bytes(&data).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let img = if img.width() > max_dim || img.height() > max_dim {
        img.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    // Convert to RGBA format
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(ImageData {
        width,
        height,
        rgba_data: rgba.into_raw(),
    })
}

/// Decode an image from raw bytes, auto-detecting the format
fn load_from_bytes(data: &[u8]) -> Result<DynamicImage, image::ImageError> {
    let format = image::guess_format(data)?;
    image::load(io::Cursor::new(data), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reports_read_error() {
        let err = load_image(Path::new("/nonexistent/nope.png"), 4096).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn garbage_bytes_report_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"not a png")
            .unwrap();
        let err = load_image(&path, 4096).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn decodes_png_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = load_image(&path, 4096).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.rgba_data.len(), 3 * 2 * 4);
    }

    #[test]
    fn oversized_image_is_downscaled_to_fit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(64, 16, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        let img = load_image(&path, 32).unwrap();
        assert_eq!((img.width, img.height), (32, 8));
    }
}
