// gallery.rs - Compressed results, size comparison and download

use crate::compression::ProcessedImage;
use crate::config::DOWNLOAD_PREFIX;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Processed images in display order.
///
/// Dropping an item releases its preview handle along with its bytes.
#[derive(Debug, Default)]
pub struct Gallery {
    items: Vec<ProcessedImage>,
}

impl Gallery {
    pub fn extend(&mut self, images: impl IntoIterator<Item = ProcessedImage>) {
        self.items.extend(images);
    }

    pub fn remove(&mut self, index: usize) -> Option<ProcessedImage> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&ProcessedImage> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.items.iter()
    }
}

/// Share of the original size saved by compression, in percent. Negative
/// when the JPEG came out larger. `None` for an empty original.
pub fn reduction_percent(original: u64, compressed: u64) -> Option<f64> {
    if original == 0 {
        return None;
    }
    Some((original as f64 - compressed as f64) / original as f64 * 100.0)
}

pub fn format_reduction(original: u64, compressed: u64) -> String {
    match reduction_percent(original, compressed) {
        Some(percent) => format!("{:.1}%", percent),
        None => String::from("n/a"),
    }
}

pub fn format_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// File name offered when saving a compressed image. The original extension
/// is kept even though the content is JPEG.
pub fn download_name(original_name: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, original_name)
}

/// Ask the user where to save `bytes`, then write them there. Returns `None`
/// when the dialog is cancelled.
pub async fn save_download(file_name: String, bytes: Arc<[u8]>) -> Result<Option<PathBuf>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_file_name(&file_name)
        .save_file()
        .await;

    match handle {
        Some(handle) => write_download(handle.path().to_path_buf(), bytes).await.map(Some),
        None => {
            tracing::debug!(file = %file_name, "download cancelled");
            Ok(None)
        }
    }
}

pub async fn write_download(path: PathBuf, bytes: Arc<[u8]>) -> Result<PathBuf> {
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), "saved compressed image");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{compress, tests::encoded_image, ImageFile};
    use image::ImageFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn processed(name: &str) -> ProcessedImage {
        compress(ImageFile::new(name, encoded_image(8, 8, ImageFormat::Png))).unwrap()
    }

    fn names(gallery: &Gallery) -> Vec<String> {
        gallery.iter().map(|p| p.original.name.clone()).collect()
    }

    #[test]
    fn test_reduction_display() {
        assert_eq!(format_reduction(1000, 400), "60.0%");
        assert_eq!(format_reduction(1000, 1200), "-20.0%");
        assert_eq!(format_reduction(1000, 1000), "0.0%");
        assert_eq!(format_reduction(3, 1), "66.7%");
    }

    #[test]
    fn test_reduction_of_empty_original() {
        assert_eq!(reduction_percent(0, 10), None);
        assert_eq!(format_reduction(0, 10), "n/a");
    }

    #[test]
    fn test_kb_display() {
        assert_eq!(format_kb(0), "0.00 KB");
        assert_eq!(format_kb(1536), "1.50 KB");
        assert_eq!(format_kb(1_000_448), "977.00 KB");
    }

    #[test]
    fn test_download_name_keeps_extension() {
        assert_eq!(download_name("cat.png"), "compressed_cat.png");
        assert_eq!(download_name("dog.JPG"), "compressed_dog.JPG");
    }

    #[test]
    fn test_gallery_order_and_removal() {
        let mut gallery = Gallery::default();
        gallery.extend(vec![processed("a.png"), processed("b.png")]);
        gallery.extend(vec![processed("c.png")]);
        assert_eq!(names(&gallery), vec!["a.png", "b.png", "c.png"]);

        let removed = gallery.remove(1).unwrap();
        assert_eq!(removed.original.name, "b.png");
        assert_eq!(names(&gallery), vec!["a.png", "c.png"]);
        assert!(gallery.remove(5).is_none());

        gallery.clear();
        assert!(gallery.is_empty());
    }

    #[tokio::test]
    async fn test_write_download() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(download_name("cat.png"));
        let bytes: Arc<[u8]> = Arc::from(vec![0xFF, 0xD8, 0xFF]);

        let written = write_download(path.clone(), bytes).await.unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_write_download_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.jpg");

        let result = write_download(path, Arc::from(vec![1u8])).await;
        assert!(matches!(result, Err(Error::Write { .. })));
    }
}
