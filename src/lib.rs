pub mod cli;
pub mod codec;
pub mod compress;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;

pub use cli::{Mode, Profile};
pub use codec::ImageCodec;
pub use config::{Quality, Settings};
pub use document::PdfDocument;
pub use error::{CodecError, CompressError, ConfigError};
pub use pipeline::{compress_file, CompressionSummary, ModeReport};
pub use render::{PageRenderer, PdfiumBackend, RasterBackend};

use std::path::{Path, PathBuf};

use compress::Silent;
use output::{prepare_output_dir, resolve_output_path};

/// High-level API for compressing one PDF.
///
/// This is the recommended entry point for library consumers. It creates the
/// output directory, picks a collision-free output name, binds Pdfium when
/// aggressive mode needs it, and runs the compression without progress
/// output.
///
/// # Arguments
///
/// * `input` - Path to the PDF to compress
/// * `mode` - Smart (images only) or aggressive (rasterize pages)
/// * `profile` - Quality preset, ignored when `quality` is given
/// * `quality` - Explicit JPEG quality in 1..=95
/// * `output_dir` - Directory for the compressed copy, created if missing
///
/// # Returns
///
/// A summary with the output path and sizes, or the error that ended the run.
/// A failed run leaves no output file behind.
///
/// # Example
///
/// ```no_run
/// use pdf_compressor::{compress_pdf, Mode, Profile};
///
/// let summary = compress_pdf(
///     "scan.pdf",
///     Mode::Smart,
///     Profile::High,
///     None,
///     "compressed_pdfs",
/// ).unwrap();
///
/// println!(
///     "{} ({:.1}% smaller)",
///     summary.output_path.display(),
///     summary.reduction_percent()
/// );
/// ```
pub fn compress_pdf(
    input: impl Into<PathBuf>,
    mode: Mode,
    profile: Profile,
    quality: Option<i64>,
    output_dir: impl AsRef<Path>,
) -> anyhow::Result<CompressionSummary> {
    let input = input.into();
    if !input.is_file() {
        return Err(ConfigError::InputNotFound(input).into());
    }

    let mut settings = Settings::new(input)
        .with_mode(mode)
        .with_profile(profile)
        .with_output_dir(output_dir);
    if let Some(value) = quality {
        settings = settings.with_quality(value)?;
    }

    prepare_output_dir(&settings.output_dir)?;
    let output_path = resolve_output_path(
        &settings.input,
        &settings.output_dir,
        &settings.profile_label,
        settings.quality,
    );

    let backend = match settings.mode {
        Mode::Smart => None,
        Mode::Aggressive => Some(PdfiumBackend::bind()?),
    };
    let raster = backend.as_ref().map(|b| b as &dyn RasterBackend);

    Ok(compress_file(&settings, &output_path, raster, &mut Silent)?)
}
