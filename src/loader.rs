//! Source document loading.
//!
//! Opens a report file and yields its text layer (for PDFs that have one)
//! and its page images. PDF pages are rendered with poppler's `pdftoppm`
//! into a temporary directory; scanned images are decoded directly.

use crate::config::RasterConfig;
use crate::constants::{IMAGE_EXTENSIONS, PDF_EXTENSIONS};
use crate::error::{Result, WatchkeeperError};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Kind of input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    /// Detect the document kind from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if PDF_EXTENSIONS.contains(&extension.as_str()) {
            Some(SourceKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(SourceKind::Image)
        } else {
            None
        }
    }
}

/// One page of a source document
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Zero-based page index in document order
    pub number: usize,
    /// Rendered page, when rendering succeeded
    pub image: Option<RgbImage>,
}

/// A loaded report document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub kind: SourceKind,
    /// Embedded PDF text, None for images or PDFs without usable text
    pub text_layer: Option<String>,
    pub pages: Vec<RawPage>,
}

impl SourceDocument {
    /// Build a document from already decoded page images
    pub fn from_images(path: impl Into<PathBuf>, images: Vec<RgbImage>) -> Self {
        Self {
            path: path.into(),
            kind: SourceKind::Image,
            text_layer: None,
            pages: images
                .into_iter()
                .enumerate()
                .map(|(number, image)| RawPage {
                    number,
                    image: Some(image),
                })
                .collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether every page has a rendered image
    pub fn has_images(&self) -> bool {
        !self.pages.is_empty() && self.pages.iter().all(|page| page.image.is_some())
    }
}

/// Loads report files into page images and text
#[derive(Debug, Clone)]
pub struct PageLoader {
    raster: RasterConfig,
}

impl PageLoader {
    pub fn new(raster: RasterConfig) -> Self {
        Self { raster }
    }

    /// Load a PDF or image file
    pub fn load(&self, path: &Path) -> Result<SourceDocument> {
        if !path.exists() {
            return Err(WatchkeeperError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let kind = SourceKind::from_path(path).ok_or_else(|| WatchkeeperError::UnsupportedInput {
            path: path.to_path_buf(),
            extension: path
                .extension()
                .map(|ext| ext.to_string_lossy().to_string())
                .unwrap_or_default(),
        })?;

        info!("Loading {} ({:?})", path.display(), kind);

        match kind {
            SourceKind::Pdf => self.load_pdf(path),
            SourceKind::Image => load_image(path),
        }
    }

    fn load_pdf(&self, path: &Path) -> Result<SourceDocument> {
        let bytes = std::fs::read(path)?;

        let text_layer = match pdf_extract::extract_text_from_mem(&bytes) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                debug!("{} has no text layer", path.display());
                None
            }
            Err(e) => {
                warn!("Could not read text layer of {}: {}", path.display(), e);
                None
            }
        };

        let images = match self.rasterize(path) {
            Ok(images) => images,
            Err(e) => {
                if text_layer.is_none() {
                    return Err(WatchkeeperError::UnreadableDocument {
                        path: path.to_path_buf(),
                        reason: format!("no text layer and pages could not be rendered: {}", e),
                    });
                }
                warn!("{}; work grid hours will be unavailable", e);
                Vec::new()
            }
        };

        debug!(
            "Loaded {}: text layer {}, {} rendered pages",
            path.display(),
            if text_layer.is_some() { "present" } else { "absent" },
            images.len()
        );

        Ok(SourceDocument {
            path: path.to_path_buf(),
            kind: SourceKind::Pdf,
            text_layer,
            pages: images
                .into_iter()
                .enumerate()
                .map(|(number, image)| RawPage {
                    number,
                    image: Some(image),
                })
                .collect(),
        })
    }

    /// Render every PDF page to PNG with pdftoppm and decode the results
    fn rasterize(&self, path: &Path) -> Result<Vec<RgbImage>> {
        let workdir = tempfile::TempDir::new()?;
        let prefix = workdir.path().join("page");

        let output = Command::new(&self.raster.program)
            .arg("-r")
            .arg(self.raster.dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| WatchkeeperError::Rasterization {
                path: path.to_path_buf(),
                reason: format!("failed to execute {}: {}", self.raster.program, e),
            })?;

        if !output.status.success() {
            return Err(WatchkeeperError::Rasterization {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // pdftoppm zero-pads page numbers, so name order is page order
        let mut rendered: Vec<PathBuf> = std::fs::read_dir(workdir.path())?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|file| file.extension().is_some_and(|ext| ext == "png"))
            .collect();
        rendered.sort();

        rendered
            .iter()
            .map(|file| -> Result<RgbImage> { Ok(image::open(file)?.to_rgb8()) })
            .collect()
    }
}

fn load_image(path: &Path) -> Result<SourceDocument> {
    let image = image::open(path)?.to_rgb8();
    Ok(SourceDocument::from_images(path, vec![image]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/report.PDF")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("scan.tiff")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(SourceKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let loader = PageLoader::new(RasterConfig::default());
        let result = loader.load(Path::new("/nonexistent/report.pdf"));
        assert!(matches!(result, Err(WatchkeeperError::InputNotFound { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.docx");
        std::fs::write(&path, b"not a report").unwrap();

        let loader = PageLoader::new(RasterConfig::default());
        assert!(matches!(
            loader.load(&path),
            Err(WatchkeeperError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn test_load_png_page() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        RgbImage::from_pixel(40, 30, Rgb([255, 255, 255])).save(&path).unwrap();

        let loader = PageLoader::new(RasterConfig::default());
        let document = loader.load(&path).unwrap();
        assert_eq!(document.kind, SourceKind::Image);
        assert_eq!(document.page_count(), 1);
        assert!(document.has_images());
        assert!(document.text_layer.is_none());
        assert_eq!(document.pages[0].image.as_ref().unwrap().dimensions(), (40, 30));
    }

    #[test]
    fn test_corrupt_image_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        std::fs::write(&path, b"definitely not png").unwrap();

        let loader = PageLoader::new(RasterConfig::default());
        assert!(matches!(loader.load(&path), Err(WatchkeeperError::Image(_))));
    }

    #[test]
    fn test_unreadable_pdf_without_renderer_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        let loader = PageLoader::new(RasterConfig {
            program: "definitely-not-a-real-pdftoppm".to_string(),
            ..RasterConfig::default()
        });
        assert!(matches!(
            loader.load(&path),
            Err(WatchkeeperError::UnreadableDocument { .. })
        ));
    }
}
