// compression.rs - Resize-and-encode routine

use crate::config::{JPEG_QUALITY, MAX_HEIGHT, MAX_WIDTH};
use crate::error::{Error, Result};
use iced::widget::image::Handle;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// A named blob of file content, either as the user supplied it or as we
/// re-encoded it.
#[derive(Clone)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One input file after resizing and JPEG re-encoding.
///
/// `compressed` keeps the original file name even though its content is
/// always JPEG. `preview` is built from the original bytes, so the gallery
/// shows the image as it was before compression.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub original: ImageFile,
    pub compressed: ImageFile,
    pub preview: Handle,
    pub dimensions: (u32, u32),
}

/// Size an image of `width`×`height` is drawn at before encoding.
///
/// Landscape and square images are bounded by width only, portrait images by
/// height only. A 1920×1400 image therefore passes through unchanged.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width >= height {
        if width > MAX_WIDTH {
            let scaled = scale(height, MAX_WIDTH, width);
            return (MAX_WIDTH, scaled);
        }
    } else if height > MAX_HEIGHT {
        let scaled = scale(width, MAX_HEIGHT, height);
        return (scaled, MAX_HEIGHT);
    }

    (width, height)
}

fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (value as f64 * numerator as f64 / denominator as f64).round();
    (scaled as u32).max(1)
}

/// Read `path` from disk and compress it.
pub fn compress_file(path: &Path) -> Result<ProcessedImage> {
    let bytes = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    compress(ImageFile::new(name, bytes))
}

/// Decode `original`, fit it within the output bounds and re-encode it as
/// JPEG.
pub fn compress(original: ImageFile) -> Result<ProcessedImage> {
    let img = image::load_from_memory(&original.bytes).map_err(Error::Decode)?;
    // The preview widget owns its bytes, so this is a second copy of the original.
    let preview = Handle::from_memory(original.bytes.to_vec());
    let (width, height) = img.dimensions();
    let dimensions = target_dimensions(width, height);

    tracing::debug!(
        name = %original.name,
        width,
        height,
        target = ?dimensions,
        "resizing image"
    );

    let data = encode_jpeg(&img, dimensions)?;
    let compressed = ImageFile::new(original.name.clone(), data);

    Ok(ProcessedImage {
        original,
        compressed,
        preview,
        dimensions,
    })
}

fn encode_jpeg(img: &DynamicImage, (width, height): (u32, u32)) -> Result<Vec<u8>> {
    let rgba_image = if img.dimensions() == (width, height) {
        img.to_rgba8()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3).to_rgba8()
    };
    let rgb_image = flatten_over_black(&rgba_image);

    let mut result_data = Vec::new();
    let mut cursor = Cursor::new(&mut result_data);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    encoder
        .encode(&rgb_image, width, height, image::ColorType::Rgb8)
        .map_err(Error::Encode)?;

    if result_data.is_empty() {
        return Err(Error::EmptyOutput);
    }

    Ok(result_data)
}

/// Composite onto an opaque black background: each channel is scaled by its
/// pixel's alpha, so fully transparent pixels come out black.
fn flatten_over_black(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let premultiply = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([premultiply(r), premultiply(g), premultiply(b)])
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::ImageFormat;
    use pretty_assertions::assert_eq;

    pub(crate) fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([40, 120, 200, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory(bytes).unwrap().dimensions()
    }

    #[test]
    fn test_small_images_keep_their_size() {
        assert_eq!(target_dimensions(800, 600), (800, 600));
        assert_eq!(target_dimensions(600, 800), (600, 800));
        assert_eq!(target_dimensions(1920, 1080), (1920, 1080));
        assert_eq!(target_dimensions(1, 1), (1, 1));
    }

    #[test]
    fn test_wide_images_are_bounded_by_width() {
        assert_eq!(target_dimensions(3840, 2160), (1920, 1080));
        assert_eq!(target_dimensions(4000, 3000), (1920, 1440));
        // 1333 * 1920 / 2000 = 1279.68
        assert_eq!(target_dimensions(2000, 1333), (1920, 1280));
    }

    #[test]
    fn test_tall_images_are_bounded_by_height() {
        assert_eq!(target_dimensions(1080, 1920), (608, 1080));
        assert_eq!(target_dimensions(1000, 1500), (720, 1080));
    }

    #[test]
    fn test_square_images_use_the_width_bound() {
        assert_eq!(target_dimensions(1500, 1500), (1500, 1500));
        assert_eq!(target_dimensions(2400, 2400), (1920, 1920));
    }

    #[test]
    fn test_only_one_axis_is_checked() {
        // Height 1400 exceeds 1080 but landscape images are width-bounded.
        assert_eq!(target_dimensions(1920, 1400), (1920, 1400));
        assert_eq!(target_dimensions(1900, 1800), (1900, 1800));
    }

    #[test]
    fn test_extreme_aspect_ratio_never_hits_zero() {
        assert_eq!(target_dimensions(100_000, 10), (1920, 1));
        assert_eq!(target_dimensions(10, 100_000), (1, 1080));
    }

    #[test]
    fn test_png_is_reencoded_as_jpeg_under_original_name() {
        let bytes = encoded_image(64, 48, ImageFormat::Png);
        let processed = compress(ImageFile::new("photo.png", bytes.clone())).unwrap();

        assert_eq!(processed.compressed.name, "photo.png");
        assert_eq!(processed.original.name, "photo.png");
        assert_eq!(&*processed.original.bytes, bytes.as_slice());
        assert_eq!(
            image::guess_format(&processed.compressed.bytes).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(processed.dimensions, (64, 48));
        assert_eq!(decoded_dimensions(&processed.compressed.bytes), (64, 48));
    }

    #[test]
    fn test_gif_is_reencoded_as_jpeg() {
        let bytes = encoded_image(30, 20, ImageFormat::Gif);
        let processed = compress(ImageFile::new("anim.gif", bytes)).unwrap();

        assert_eq!(
            image::guess_format(&processed.compressed.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_large_landscape_is_downscaled() {
        let bytes = encoded_image(2400, 1200, ImageFormat::Png);
        let processed = compress(ImageFile::new("wide.png", bytes)).unwrap();

        assert_eq!(processed.dimensions, (1920, 960));
        assert_eq!(decoded_dimensions(&processed.compressed.bytes), (1920, 960));
    }

    #[test]
    fn test_large_portrait_is_downscaled() {
        let bytes = encoded_image(600, 1350, ImageFormat::Png);
        let processed = compress(ImageFile::new("tall.png", bytes)).unwrap();

        assert_eq!(decoded_dimensions(&processed.compressed.bytes), (480, 1080));
    }

    #[test]
    fn test_compressing_twice_keeps_dimensions() {
        let bytes = encoded_image(2400, 1200, ImageFormat::Png);
        let first = compress(ImageFile::new("wide.png", bytes)).unwrap();
        let second = compress(first.compressed.clone()).unwrap();

        assert_eq!(second.dimensions, first.dimensions);
        assert_eq!(second.compressed.name, "wide.png");
    }

    fn compressed_pixel(pixel: Rgba<u8>) -> Rgb<u8> {
        let img = RgbaImage::from_pixel(16, 16, pixel);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let processed = compress(ImageFile::new("alpha.png", bytes)).unwrap();
        let decoded = image::load_from_memory(&processed.compressed.bytes).unwrap();
        *decoded.to_rgb8().get_pixel(8, 8)
    }

    fn assert_close(actual: Rgb<u8>, expected: [u8; 3]) {
        for (a, e) in actual.0.iter().zip(expected) {
            assert!(
                (*a as i16 - e as i16).abs() <= 3,
                "got {:?}, expected about {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_transparency_is_flattened_over_black() {
        assert_close(compressed_pixel(Rgba([255, 255, 255, 0])), [0, 0, 0]);
        assert_close(compressed_pixel(Rgba([40, 120, 200, 128])), [20, 60, 100]);
        assert_close(compressed_pixel(Rgba([40, 120, 200, 255])), [40, 120, 200]);
    }

    #[test]
    fn test_flatten_scales_by_alpha() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        img.put_pixel(1, 0, Rgba([40, 120, 200, 128]));
        img.put_pixel(2, 0, Rgba([10, 20, 30, 255]));

        let flat = flatten_over_black(&img);
        assert_eq!(*flat.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([20, 60, 100]));
        assert_eq!(*flat.get_pixel(2, 0), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let result = compress(ImageFile::new("broken.jpg", b"not an image".to_vec()));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = compress_file(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_compress_file_uses_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("holiday.jpg");
        fs::write(&path, encoded_image(16, 16, ImageFormat::Png)).unwrap();

        let processed = compress_file(&path).unwrap();
        assert_eq!(processed.original.name, "holiday.jpg");
        assert_eq!(processed.compressed.name, "holiday.jpg");
    }
}
