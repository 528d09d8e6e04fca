use image::{DynamicImage, RgbImage};
use pdfium_render::prelude::*;

use crate::document::PageRect;
use crate::error::CompressError;

use super::{PageRenderer, RasterBackend};

/// Rasterizer backed by the pdfium shared library
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind to pdfium, looking next to the working directory first and then
    /// in the system library path.
    pub fn bind() -> Result<Self, CompressError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                CompressError::RasterizerUnavailable(format!(
                    "failed to bind to the pdfium library: {}",
                    e
                ))
            })?;
        log::debug!("Bound to pdfium");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl RasterBackend for PdfiumBackend {
    fn open<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<Box<dyn PageRenderer + 'a>, CompressError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| CompressError::RasterizerUnavailable(e.to_string()))?;
        Ok(Box::new(PdfiumRenderer { document }))
    }
}

struct PdfiumRenderer<'a> {
    document: PdfDocument<'a>,
}

impl PageRenderer for PdfiumRenderer<'_> {
    fn render_page(
        &self,
        index: usize,
        rect: PageRect,
        dpi: f32,
    ) -> Result<DynamicImage, CompressError> {
        let fail = |message: String| CompressError::Rasterize {
            page: index + 1,
            message,
        };

        let page_index =
            u16::try_from(index).map_err(|_| fail("page index exceeds pdfium range".to_string()))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| fail(e.to_string()))?;

        let (width, height) = rect.pixel_size(dpi);
        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_height(height as i32)
            .render_form_data(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| fail(e.to_string()))?;

        // Rebuild through raw bytes so pdfium-render's own `image` version
        // never leaks into our types.
        let rgb = bitmap.as_image().into_rgb8();
        let (w, h) = rgb.dimensions();
        RgbImage::from_raw(w, h, rgb.into_raw())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| fail("pdfium returned a malformed bitmap".to_string()))
    }
}
