/// Directory compressed files are written to when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "compressed_pdfs";

/// Rasterization resolution for aggressive mode, in dots per inch
pub const DEFAULT_RASTER_DPI: f32 = 150.0;

/// Lowest accepted JPEG quality
pub const MIN_QUALITY: u8 = 1;

/// Highest accepted JPEG quality
pub const MAX_QUALITY: u8 = 95;

/// JPEG quality for the `low` profile (smallest files)
pub const LOW_QUALITY: u8 = 20;

/// JPEG quality for the `medium` profile (default)
pub const MEDIUM_QUALITY: u8 = 40;

/// JPEG quality for the `high` profile
pub const HIGH_QUALITY: u8 = 60;

/// JPEG quality for the `best` profile (near-original)
pub const BEST_QUALITY: u8 = 80;

/// Label used in output file names when `--quality` overrides the profile
pub const CUSTOM_PROFILE_LABEL: &str = "custom";
