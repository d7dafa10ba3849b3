//! Image loading, saving and output path generation

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::canvas;
use crate::color::WHITE;

/// Error type for image I/O
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Extensions treated as images by folder scans and saves
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Check if a path has one of the supported image extensions (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load an image and flatten it to opaque RGB.
///
/// Transparent pixels keep their stored color channels; alpha is dropped so
/// every transform sees the same pixels regardless of the source format.
pub fn load_image(path: &Path) -> Result<RgbaImage, OutputError> {
    let decoded = image::open(path)?;
    Ok(DynamicImage::ImageRgb8(decoded.to_rgb8()).to_rgba8())
}

/// Save an image, encoding by file extension.
///
/// Parent directories are created as needed. Formats without alpha support
/// in the encoder (JPEG, BMP) are written as RGB.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("png").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "bmp" => DynamicImage::ImageRgba8(image.clone()).to_rgb8().save(path)?,
        _ => image.save(path)?,
    }
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This preserves crisp pixel edges for pixel art. A factor of 0 or 1
/// returns the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Output path for a processed image: `out_dir/{stem}{suffix}.{ext}`.
///
/// The input's extension is kept; an input without one gets `.png`.
pub fn processed_output_path(input: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("png");
    out_dir.join(format!("{}{}.{}", stem, suffix, ext))
}

/// Default output path for a single image next to its input.
pub fn sibling_output_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new(""));
    processed_output_path(input, parent, suffix)
}

/// Original and processed images upscaled and stacked vertically.
///
/// The sheet is as wide as the wider of the two; the rest is white.
pub fn preview_sheet(original: &RgbaImage, processed: &RgbaImage, factor: u32) -> RgbaImage {
    let top = scale_image(original.clone(), factor);
    let bottom = scale_image(processed.clone(), factor);

    let width = top.width().max(bottom.width());
    let mut sheet = canvas::blank(width, top.height() + bottom.height(), WHITE);
    canvas::paste(&mut sheet, &top, 0, 0);
    canvas::paste(&mut sheet, &bottom, 0, top.height() as i64);
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("dir/b.JPEG")));
        assert!(is_image_file(Path::new("c.Gif")));
        assert!(!is_image_file(Path::new("d.gbsres")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_processed_output_path() {
        let path = processed_output_path(Path::new("input/bg/town.png"), Path::new("output/bg"), "_processed");
        assert_eq!(path, PathBuf::from("output/bg/town_processed.png"));

        let path = processed_output_path(Path::new("hero.bmp"), Path::new("out"), "");
        assert_eq!(path, PathBuf::from("out/hero.bmp"));
    }

    #[test]
    fn test_sibling_output_path() {
        assert_eq!(sibling_output_path(Path::new("town.png"), "_x"), PathBuf::from("town_x.png"));
        assert_eq!(
            sibling_output_path(Path::new("assets/town.png"), "_x"),
            PathBuf::from("assets/town_x.png")
        );
    }

    #[test]
    fn test_save_and_load_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/test.png");

        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 0]));

        save_image(&image, &path).unwrap();
        assert!(path.exists());

        let loaded = load_image(&path).unwrap();
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*loaded.get_pixel(1, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_save_bmp_writes_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bmp");
        save_image(&RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])), &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(*loaded.get_pixel(2, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(load_image(Path::new("/definitely/not/here.png")).is_err());
    }

    #[test]
    fn test_scale_image_factor_two() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));

        let scaled = scale_image(image, 2);
        assert_eq!(scaled.dimensions(), (4, 2));
        assert_eq!(*scaled.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*scaled.get_pixel(2, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_scale_image_factor_one_returns_original() {
        let image = RgbaImage::new(3, 3);
        assert_eq!(scale_image(image.clone(), 1), image);
        assert_eq!(scale_image(image.clone(), 0), image);
    }

    #[test]
    fn test_preview_sheet_layout() {
        let original = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        let processed = RgbaImage::from_pixel(4, 1, Rgba([2, 2, 2, 255]));
        let sheet = preview_sheet(&original, &processed, 2);

        assert_eq!(sheet.dimensions(), (8, 6));
        assert_eq!(*sheet.get_pixel(3, 3), Rgba([1, 1, 1, 255]));
        assert_eq!(*sheet.get_pixel(5, 1), WHITE);
        assert_eq!(*sheet.get_pixel(7, 5), Rgba([2, 2, 2, 255]));
    }
}
