//! # Image Export
//!
//! Renders decoded rows to a grayscale bitmap and writes it in a common
//! format.
//!
//! ## Pixel Mapping
//!
//! ```text
//! row byte 0xC3 = 11000011
//!                 ██░░░░██   bit set = black (0), clear = white (255)
//! ```
//!
//! Width is the widest row times 8; height is the row count. If a capture
//! switched row length mid-block, shorter rows are padded with white on the
//! right.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::{GrayImage, ImageFormat, Luma};
use serde::Serialize;

use crate::error::TivuError;
use crate::pcl::Image;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Output formats offered for saving a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

impl ExportFormat {
    pub const ALL: &'static [Self] = &[Self::Png, Self::Jpeg, Self::Bmp, Self::Tiff];

    /// Preferred file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Every extension that identifies this format.
    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Bmp => &["bmp"],
            Self::Tiff => &["tiff", "tif"],
        }
    }

    /// Match an extension or format name, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| {
            format!("Unknown image format '{}'. Use png, jpeg, bmp or tiff", s)
        })
    }
}

/// Append the format's extension unless `path` already carries one of its
/// extensions.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use tivu::export::{ensure_extension, ExportFormat};
///
/// assert_eq!(ensure_extension(Path::new("Image"), ExportFormat::Png), PathBuf::from("Image.png"));
/// assert_eq!(ensure_extension(Path::new("a.TIF"), ExportFormat::Tiff), PathBuf::from("a.TIF"));
/// ```
pub fn ensure_extension(path: &Path, format: ExportFormat) -> PathBuf {
    if ExportFormat::from_path(path) == Some(format) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Render rows to a grayscale bitmap.
pub fn to_gray_image(image: &Image) -> GrayImage {
    if !image.is_uniform() {
        log::warn!("rows differ in length; padding to {} bytes", image.width_bytes());
    }

    let width = image.width_pixels();
    let mut img = GrayImage::from_pixel(width as u32, image.height() as u32, WHITE);

    for (y, row) in image.rows().iter().enumerate() {
        for (byte_idx, byte) in row.iter().enumerate() {
            for bit in 0..8 {
                if (byte >> (7 - bit)) & 1 == 1 {
                    img.put_pixel((byte_idx * 8 + bit) as u32, y as u32, BLACK);
                }
            }
        }
    }

    img
}

fn check_not_empty(image: &Image) -> Result<(), TivuError> {
    if image.is_empty() || image.width_bytes() == 0 {
        return Err(TivuError::Image("Nothing to export: image is empty".to_string()));
    }
    Ok(())
}

/// Encode rows in `format`.
pub fn encode(image: &Image, format: ExportFormat) -> Result<Vec<u8>, TivuError> {
    check_not_empty(image)?;

    let mut out = Cursor::new(Vec::new());
    to_gray_image(image)
        .write_to(&mut out, format.image_format())
        .map_err(|e| TivuError::Image(format!("Failed to encode {:?}: {}", format, e)))?;
    Ok(out.into_inner())
}

/// Write rows to `path` in `format`, adding the extension if missing.
/// Returns the path actually written.
pub fn save(image: &Image, path: &Path, format: ExportFormat) -> Result<PathBuf, TivuError> {
    check_not_empty(image)?;

    let path = ensure_extension(path, format);
    to_gray_image(image)
        .save_with_format(&path, format.image_format())
        .map_err(|e| TivuError::Image(format!("Failed to save {}: {}", path.display(), e)))?;

    log::info!(
        "saved {}x{} image to {}",
        image.width_pixels(),
        image.height(),
        path.display()
    );
    Ok(path)
}

/// File stem for a capture taken at `time`: `capture-YYYYmmdd-HHMMSS`.
pub fn capture_file_name(time: &NaiveDateTime) -> String {
    time.format("capture-%Y%m%d-%H%M%S").to_string()
}

/// Dimensions of a decoded image, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    pub width: usize,
    pub height: usize,
    pub width_bytes: usize,
    pub uniform: bool,
}

impl ImageSummary {
    pub fn of(image: &Image) -> Self {
        Self {
            width: image.width_pixels(),
            height: image.height(),
            width_bytes: image.width_bytes(),
            uniform: image.is_uniform(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checker() -> Image {
        Image::from(vec![vec![0xAA, 0x0F], vec![0x55, 0xF0]])
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_extension("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_extension("jpeg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_extension("jpg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_extension("tif"), Some(ExportFormat::Tiff));
        assert_eq!(ExportFormat::from_extension("gif"), None);
        assert_eq!("bmp".parse::<ExportFormat>(), Ok(ExportFormat::Bmp));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/shot.bmp")),
            Some(ExportFormat::Bmp)
        );
        assert_eq!(ExportFormat::from_path(Path::new("shot")), None);
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(
            ensure_extension(Path::new("dump"), ExportFormat::Jpeg),
            PathBuf::from("dump.jpg")
        );
        assert_eq!(
            ensure_extension(Path::new("dump.jpeg"), ExportFormat::Jpeg),
            PathBuf::from("dump.jpeg")
        );
        assert_eq!(
            ensure_extension(Path::new("dump.png"), ExportFormat::Bmp),
            PathBuf::from("dump.png.bmp")
        );
    }

    #[test]
    fn test_gray_image_pixels() {
        let img = to_gray_image(&checker());
        assert_eq!(img.dimensions(), (16, 2));
        assert_eq!(img.get_pixel(0, 0), &BLACK);
        assert_eq!(img.get_pixel(1, 0), &WHITE);
        assert_eq!(img.get_pixel(12, 0), &BLACK);
        assert_eq!(img.get_pixel(0, 1), &WHITE);
        assert_eq!(img.get_pixel(1, 1), &BLACK);
        assert_eq!(img.get_pixel(15, 1), &WHITE);
    }

    #[test]
    fn test_ragged_rows_are_padded_white() {
        let image = Image::from(vec![vec![0xFF, 0xFF], vec![0xFF]]);
        let img = to_gray_image(&image);
        assert_eq!(img.dimensions(), (16, 2));
        assert_eq!(img.get_pixel(7, 1), &BLACK);
        assert_eq!(img.get_pixel(8, 1), &WHITE);
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let bytes = encode(&checker(), ExportFormat::Png).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 2));
    }

    #[test]
    fn test_encode_empty_image_fails() {
        assert!(matches!(
            encode(&Image::new(), ExportFormat::Png),
            Err(TivuError::Image(_))
        ));
        assert!(encode(&Image::from(vec![vec![]]), ExportFormat::Png).is_err());
    }

    #[test]
    fn test_save_every_format() {
        let dir = tempfile::tempdir().unwrap();
        for &format in ExportFormat::ALL {
            let written = save(&checker(), &dir.path().join("capture"), format).unwrap();
            assert_eq!(ExportFormat::from_path(&written), Some(format));
            assert!(written.exists());
        }
    }

    #[test]
    fn test_capture_file_name() {
        let time = chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(capture_file_name(&time), "capture-20261016-090507");
    }

    #[test]
    fn test_summary() {
        let summary = ImageSummary::of(&checker());
        assert_eq!(
            summary,
            ImageSummary {
                width: 16,
                height: 2,
                width_bytes: 2,
                uniform: true,
            }
        );
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"width":16,"height":2,"width_bytes":2,"uniform":true}"#
        );
    }
}
