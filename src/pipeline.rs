//! Whole-run orchestration: open, compress, save, measure, clean up.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::Mode;
use crate::codec::ImageCodec;
use crate::compress::{
    compress_aggressive, compress_smart, AggressiveReport, ProgressSink, SmartReport,
};
use crate::config::Settings;
use crate::document::PdfDocument;
use crate::error::CompressError;
use crate::render::RasterBackend;

/// Per-mode outcome of a run
#[derive(Debug, Clone)]
pub enum ModeReport {
    Smart(SmartReport),
    Aggressive(AggressiveReport),
}

impl ModeReport {
    /// Images recompressed or pages rasterized
    pub fn processed(&self) -> usize {
        match self {
            ModeReport::Smart(r) => r.recompressed,
            ModeReport::Aggressive(r) => r.rasterized,
        }
    }

    /// Candidate images or pages
    pub fn total(&self) -> usize {
        match self {
            ModeReport::Smart(r) => r.total,
            ModeReport::Aggressive(r) => r.total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressionSummary {
    pub output_path: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    pub duration: Duration,
    pub report: ModeReport,
}

impl CompressionSummary {
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.original_size, self.compressed_size)
    }
}

/// `(1 - compressed / original) * 100`, or 0 for an empty original
pub fn reduction_percent(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - compressed_size as f64 / original_size as f64) * 100.0
}

/// Compress `settings.input` into `output_path`.
///
/// `raster` is only consulted in aggressive mode. On any error the output
/// file is removed, so a failed run never leaves a partial artifact.
pub fn compress_file(
    settings: &Settings,
    output_path: &Path,
    raster: Option<&dyn RasterBackend>,
    progress: &mut dyn ProgressSink,
) -> Result<CompressionSummary, CompressError> {
    let original_size = fs::metadata(&settings.input)?.len();
    let start = Instant::now();

    match run(settings, output_path, raster, progress) {
        Ok((report, compressed_size)) => Ok(CompressionSummary {
            output_path: output_path.to_path_buf(),
            original_size,
            compressed_size,
            duration: start.elapsed(),
            report,
        }),
        Err(e) => {
            remove_partial_output(output_path);
            Err(e)
        }
    }
}

fn run(
    settings: &Settings,
    output_path: &Path,
    raster: Option<&dyn RasterBackend>,
    progress: &mut dyn ProgressSink,
) -> Result<(ModeReport, u64), CompressError> {
    let codec = ImageCodec::new(settings.quality);
    let mut doc = PdfDocument::open(&settings.input)?;
    log::info!(
        "Opened {} ({} pages)",
        settings.input.display(),
        doc.page_count()
    );

    match settings.mode {
        Mode::Smart => {
            let report = compress_smart(&mut doc, &codec, progress)?;
            let size = doc.save(output_path)?;
            Ok((ModeReport::Smart(report), size))
        }
        Mode::Aggressive => {
            let backend = raster.ok_or_else(|| {
                CompressError::RasterizerUnavailable(
                    "aggressive mode needs a page rasterizer".to_string(),
                )
            })?;
            let bytes = fs::read(&settings.input)?;
            let renderer = backend.open(&bytes)?;
            let (mut output, report) = compress_aggressive(
                &doc,
                renderer.as_ref(),
                &codec,
                settings.raster_dpi,
                progress,
            )?;
            let size = output.save(output_path)?;
            Ok((ModeReport::Aggressive(report), size))
        }
    }
}

fn remove_partial_output(path: &Path) {
    if path.is_file() {
        match fs::remove_file(path) {
            Ok(()) => log::info!("Removed incomplete output {}", path.display()),
            Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}
