use crate::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use std::{io::Cursor, path::Path};
use tracing::debug;

/// Loads an image and turns it into a base64 JPEG no larger than
/// `max_dimension` on its longest side.
pub fn encode_for_transport(path: &Path, max_dimension: u32) -> Result<String> {
    let img = image::open(path)?;
    let bytes = encode_image(img, max_dimension)?;
    Ok(STANDARD.encode(bytes))
}

fn encode_image(img: DynamicImage, max_dimension: u32) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let mut img = DynamicImage::ImageRgb8(img.to_rgb8());

    if img.width().max(img.height()) > max_dimension {
        debug!(
            "Downscaling {}x{} image to fit {}px",
            img.width(),
            img.height(),
            max_dimension
        );
        img = img.thumbnail(max_dimension, max_dimension);
    }

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join("input.png");
        RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 128]))
            .save(&path)
            .unwrap();
        path
    }

    fn decode(encoded: &str) -> DynamicImage {
        let bytes = STANDARD.decode(encoded).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 400, 200);

        let img = decode(&encode_for_transport(&path, 100).unwrap());
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn test_small_image_keeps_size() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, 40, 30);

        let img = decode(&encode_for_transport(&path, 1024).unwrap());
        assert_eq!(img.dimensions(), (40, 30));
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = encode_for_transport(&path, 1024).unwrap_err();
        assert_eq!(err.category(), "Image");
    }
}
