//! Aggressive mode: every page becomes one full-page JPEG.
//!
//! All text and vector content is lost. Unlike smart mode, any failure aborts
//! the run, since a missing page would silently corrupt the output.

use crate::codec::ImageCodec;
use crate::document::{PageRect, PdfDocument};
use crate::error::CompressError;
use crate::render::PageRenderer;

use super::progress::{ProgressSink, Stage};

#[derive(Debug, Clone, Default)]
pub struct AggressiveReport {
    /// Pages rasterized into the output document
    pub rasterized: usize,
    /// Pages in the source document
    pub total: usize,
}

/// Build a new document with one image per page of `source`.
///
/// Each output page has the same size as its source page, and the image
/// fills it exactly.
pub fn compress_aggressive(
    source: &PdfDocument,
    renderer: &dyn PageRenderer,
    codec: &ImageCodec,
    dpi: f32,
    progress: &mut dyn ProgressSink,
) -> Result<(PdfDocument, AggressiveReport), CompressError> {
    let page_count = source.page_count();
    let mut output = PdfDocument::new();
    let mut report = AggressiveReport {
        rasterized: 0,
        total: page_count,
    };

    for index in 0..page_count {
        progress.page(Stage::Rasterizing, index + 1, page_count);

        let rect = source.page_geometry(index)?;
        let bitmap = renderer.render_page(index, rect, dpi)?;
        let jpeg = codec.encode(&bitmap)?;
        log::debug!(
            "Page {}: {}x{} px, {} bytes",
            index + 1,
            jpeg.width,
            jpeg.height,
            jpeg.data.len()
        );

        let target = output.new_page(rect.width, rect.height)?;
        output.insert_image(target, PageRect::from_size(rect.width, rect.height), &jpeg)?;
        report.rasterized += 1;
    }
    progress.finish();

    log::info!("Rasterized {} pages at {} DPI", report.rasterized, dpi);
    Ok((output, report))
}


#[cfg(test)]
mod tests {
    use super::test_renderer::FlatRenderer;
    use super::*;
    use crate::compress::progress::Recorder;
    use crate::config::Quality;
    use crate::document::fixtures::*;

    fn codec() -> ImageCodec {
        ImageCodec::new(Quality::new(40).unwrap())
    }

    fn mixed_page_source() -> PdfDocument {
        let mut builder = PdfBuilder::new();
        builder.page_with_box([0.0, 0.0, 612.0, 792.0], 0);
        builder.page_with_box([0.0, 0.0, 595.0, 842.0], 0);
        builder.page_with_box([10.0, 10.0, 210.0, 110.0], 0);
        builder.page_with_box([0.0, 0.0, 612.0, 792.0], 90);
        PdfDocument::load_mem(&builder.finish()).unwrap()
    }

    #[test]
    fn test_output_matches_page_count_and_sizes() {
        let source = mixed_page_source();
        let renderer = FlatRenderer::default();
        let mut progress = Recorder::default();

        let (output, report) =
            compress_aggressive(&source, &renderer, &codec(), 72.0, &mut progress).unwrap();

        assert_eq!(report.rasterized, 4);
        assert_eq!(report.total, 4);
        assert_eq!(output.page_count(), source.page_count());
        for i in 0..4 {
            let src = source.page_geometry(i).unwrap();
            let out = output.page_geometry(i).unwrap();
            assert_eq!((out.width, out.height), (src.width, src.height));
            assert_eq!(output.page_images(i).unwrap().len(), 1);
        }
        let rotated = output.page_geometry(3).unwrap();
        assert_eq!((rotated.width, rotated.height), (792.0, 612.0));
        assert_eq!(progress.updates.last(), Some(&(Stage::Rasterizing, 4, 4)));
    }

    #[test]
    fn test_image_resolution_follows_dpi() {
        let source = mixed_page_source();
        let (output, _) = compress_aggressive(
            &source,
            &FlatRenderer::default(),
            &codec(),
            144.0,
            &mut Recorder::default(),
        )
        .unwrap();

        let image = output.page_images(2).unwrap()[0];
        let stream = output.inner().get_object(image.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 400);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 200);
    }

    #[test]
    fn test_render_failure_aborts() {
        let source = mixed_page_source();
        let renderer = FlatRenderer {
            fail_on: Some(1),
            ..Default::default()
        };

        let result =
            compress_aggressive(&source, &renderer, &codec(), 72.0, &mut Recorder::default());
        assert!(matches!(
            result,
            Err(CompressError::Rasterize { page: 2, .. })
        ));
        assert_eq!(renderer.calls.get(), 2);
    }
}
