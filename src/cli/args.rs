use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::defaults::{
    BEST_QUALITY, DEFAULT_OUTPUT_DIR, DEFAULT_RASTER_DPI, HIGH_QUALITY, LOW_QUALITY,
    MEDIUM_QUALITY,
};
use crate::config::Quality;

#[derive(Parser, Debug)]
#[command(name = "pdf-compressor")]
#[command(
    author,
    version,
    about = "Compress PDF files by recompressing embedded images or rasterizing pages"
)]
pub struct Args {
    /// Path to the input PDF file to be compressed
    #[arg(required = true)]
    pub input: PathBuf,

    /// Compression mode
    #[arg(short, long, value_enum, default_value = "smart")]
    pub mode: Mode,

    /// Compression profile, determines the image quality
    #[arg(short, long, value_enum, default_value = "medium")]
    pub profile: Profile,

    /// Custom compression quality (1-95), overrides --profile
    #[arg(short, long, value_name = "1-95", allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Directory to save the compressed file
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Rasterization resolution used by aggressive mode
    #[arg(long, default_value_t = DEFAULT_RASTER_DPI)]
    pub dpi: f32,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Compression strategy
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum Mode {
    /// Recompress embedded images only, keeping text and vector graphics.
    /// Best for text-based or mixed-content PDFs.
    #[default]
    Smart,
    /// Convert every page into a single compressed image.
    /// Best for scanned documents.
    Aggressive,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Smart => "smart",
            Mode::Aggressive => "aggressive",
        }
    }
}

/// Named quality preset
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum Profile {
    /// Highest compression, smallest size (quality 20)
    Low,
    /// Balance between size and quality (quality 40)
    #[default]
    Medium,
    /// Better quality, larger size (quality 60)
    High,
    /// Near-original quality, minimal compression (quality 80)
    Best,
}

impl Profile {
    pub fn quality(&self) -> Quality {
        let value = match self {
            Profile::Low => LOW_QUALITY,
            Profile::Medium => MEDIUM_QUALITY,
            Profile::High => HIGH_QUALITY,
            Profile::Best => BEST_QUALITY,
        };
        Quality::from_preset(value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Low => "low",
            Profile::Medium => "medium",
            Profile::High => "high",
            Profile::Best => "best",
        }
    }
}
