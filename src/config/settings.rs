use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::{Args, Mode, Profile};
use crate::error::ConfigError;

use super::defaults::*;

/// JPEG quality guaranteed to lie within `MIN_QUALITY..=MAX_QUALITY`
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (i64::from(MIN_QUALITY)..=i64::from(MAX_QUALITY)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::QualityOutOfRange(value))
        }
    }

    /// Build from one of the profile constants, which are in range by definition.
    pub(crate) fn from_preset(value: u8) -> Self {
        Self(value.clamp(MIN_QUALITY, MAX_QUALITY))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime settings for one compression run
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub mode: Mode,
    /// Profile name, or "custom" when the quality was given explicitly
    pub profile_label: String,
    pub quality: Quality,
    pub output_dir: PathBuf,
    /// Rasterization resolution for aggressive mode
    pub raster_dpi: f32,
}

impl Settings {
    /// Settings for `input` with the default mode, profile and output directory
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let profile = Profile::default();
        Self {
            input: input.into(),
            mode: Mode::default(),
            profile_label: profile.as_str().to_string(),
            quality: profile.quality(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            raster_dpi: DEFAULT_RASTER_DPI,
        }
    }

    /// Create settings from CLI arguments.
    ///
    /// Input existence is checked first so a missing file is reported even
    /// when the quality is also wrong.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !args.input.is_file() {
            return Err(ConfigError::InputNotFound(args.input.clone()));
        }

        let settings = Self::new(&args.input)
            .with_mode(args.mode)
            .with_profile(args.profile)
            .with_output_dir(&args.output_dir)
            .with_raster_dpi(args.dpi)?;

        match args.quality {
            Some(value) => settings.with_quality(value),
            None => Ok(settings),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile_label = profile.as_str().to_string();
        self.quality = profile.quality();
        self
    }

    /// Override the profile with an explicit quality
    pub fn with_quality(mut self, value: i64) -> Result<Self, ConfigError> {
        self.quality = Quality::new(value)?;
        self.profile_label = CUSTOM_PROFILE_LABEL.to_string();
        Ok(self)
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_raster_dpi(mut self, dpi: f32) -> Result<Self, ConfigError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(ConfigError::InvalidDpi(dpi));
        }
        self.raster_dpi = dpi;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_quality_bounds() {
        assert_eq!(Quality::new(1).unwrap().get(), 1);
        assert_eq!(Quality::new(95).unwrap().get(), 95);
        for bad in [0, 96, -5, 1000] {
            assert!(matches!(
                Quality::new(bad),
                Err(ConfigError::QualityOutOfRange(v)) if v == bad
            ));
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::new("doc.pdf");
        assert_eq!(settings.mode, Mode::Smart);
        assert_eq!(settings.profile_label, "medium");
        assert_eq!(settings.quality.get(), 40);
        assert_eq!(settings.output_dir, PathBuf::from("compressed_pdfs"));
    }

    #[test]
    fn test_custom_quality_overrides_profile() {
        let settings = Settings::new("doc.pdf")
            .with_profile(Profile::Best)
            .with_quality(33)
            .unwrap();
        assert_eq!(settings.quality.get(), 33);
        assert_eq!(settings.profile_label, "custom");
    }

    #[test]
    fn test_invalid_dpi() {
        assert!(Settings::new("doc.pdf").with_raster_dpi(0.0).is_err());
        assert!(Settings::new("doc.pdf").with_raster_dpi(-72.0).is_err());
        assert!(Settings::new("doc.pdf").with_raster_dpi(f32::NAN).is_err());
        assert!(Settings::new("doc.pdf").with_raster_dpi(300.0).is_ok());
    }

    #[test]
    fn test_from_args_missing_input() {
        let args = Args::parse_from(["pdf-compressor", "/definitely/not/here.pdf", "-q", "0"]);
        assert!(matches!(
            Settings::from_args(&args),
            Err(ConfigError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_from_args_profile_and_quality() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.5").unwrap();
        let input = input.to_str().unwrap();

        let args = Args::parse_from(["pdf-compressor", input, "-p", "high"]);
        let settings = Settings::from_args(&args).unwrap();
        assert_eq!(settings.profile_label, "high");
        assert_eq!(settings.quality.get(), 60);

        let args = Args::parse_from(["pdf-compressor", input, "-p", "high", "-q", "96"]);
        assert!(matches!(
            Settings::from_args(&args),
            Err(ConfigError::QualityOutOfRange(96))
        ));
    }
}
