//! Smart mode: recompress embedded images in place.
//!
//! Text, vector graphics and page structure are never touched. A single image
//! that cannot be extracted, decoded or written back is skipped and the pass
//! carries on.

use std::collections::HashSet;

use crate::codec::ImageCodec;
use crate::document::{ImageRef, PdfDocument};
use crate::error::CompressError;

use super::progress::{ProgressSink, Stage};

/// An image left as it was, and why
#[derive(Debug, Clone)]
pub struct SkippedImage {
    pub image: ImageRef,
    pub page: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SmartReport {
    /// Images replaced with a recompressed JPEG
    pub recompressed: usize,
    /// Distinct images encountered
    pub total: usize,
    pub skipped: Vec<SkippedImage>,
}

/// Recompress every distinct embedded image of `doc` with `codec`.
///
/// An image shared by several pages is handled on its first page only, so it
/// is never re-encoded twice in one run. Only structural failures (an
/// unreadable page) end the pass early.
pub fn compress_smart(
    doc: &mut PdfDocument,
    codec: &ImageCodec,
    progress: &mut dyn ProgressSink,
) -> Result<SmartReport, CompressError> {
    let page_count = doc.page_count();
    let mut report = SmartReport::default();
    let mut seen = HashSet::new();

    for index in 0..page_count {
        progress.page(Stage::Analyzing, index + 1, page_count);

        for image in doc.page_images(index)? {
            if !seen.insert(image) {
                log::debug!("{} on page {} already handled", image, index + 1);
                continue;
            }
            report.total += 1;

            match recompress_one(doc, codec, image) {
                Ok(()) => report.recompressed += 1,
                Err(e) => {
                    log::debug!("Skipping {} on page {}: {}", image, index + 1, e);
                    report.skipped.push(SkippedImage {
                        image,
                        page: index + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
    progress.finish();

    log::info!(
        "Re-compressed {} out of {} images at quality {}",
        report.recompressed,
        report.total,
        codec.quality()
    );
    Ok(report)
}

fn recompress_one(
    doc: &mut PdfDocument,
    codec: &ImageCodec,
    image: ImageRef,
) -> Result<(), CompressError> {
    let source = doc.extract_image(image)?;
    let jpeg = codec.recompress(&source)?;
    doc.update_image(image, &jpeg)
}
