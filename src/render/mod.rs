//! Page rasterization for aggressive mode

mod pdfium;

use image::DynamicImage;

use crate::document::PageRect;
use crate::error::CompressError;

pub use pdfium::PdfiumBackend;

/// Renders pages of one loaded document
pub trait PageRenderer {
    /// Render page `index` (zero-based) at `dpi`. `rect` is the page's
    /// visible rectangle in points, as reported by the document handle.
    fn render_page(&self, index: usize, rect: PageRect, dpi: f32)
        -> Result<DynamicImage, CompressError>;
}

/// Loads documents for rendering
pub trait RasterBackend {
    fn open<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<Box<dyn PageRenderer + 'a>, CompressError>;
}
