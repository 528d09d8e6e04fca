//! Image codec adapter
//!
//! Decodes whatever an embedded image holds and re-encodes it as a baseline
//! JPEG at the requested quality. Quality is the only lever; images are never
//! resized.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, RgbImage};

use crate::config::Quality;
use crate::error::CodecError;

/// Sample layout of a raw (non self-describing) image buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawColor {
    Gray,
    Rgb,
}

impl RawColor {
    pub fn components(&self) -> usize {
        match self {
            RawColor::Gray => 1,
            RawColor::Rgb => 3,
        }
    }
}

/// Image data as pulled out of a PDF image stream
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A complete encoded file (JPEG, PNG, ...) the codec can sniff
    Encoded(Vec<u8>),
    /// Decompressed 8-bit samples, row-major, no padding
    Raw {
        width: u32,
        height: u32,
        color: RawColor,
        samples: Vec<u8>,
    },
}

/// Color layout of an encoded JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColor {
    Gray,
    Rgb,
}

impl JpegColor {
    /// Matching PDF device color space name
    pub fn color_space(&self) -> &'static str {
        match self {
            JpegColor::Gray => "DeviceGray",
            JpegColor::Rgb => "DeviceRGB",
        }
    }
}

/// JPEG bytes plus the facts a PDF image dictionary needs
#[derive(Debug, Clone)]
pub struct EncodedJpeg {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color: JpegColor,
}

/// JPEG re-encoder bound to a single quality setting
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    quality: Quality,
}

impl ImageCodec {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Decode `source` and re-encode it at this codec's quality.
    pub fn recompress(&self, source: &ImageSource) -> Result<EncodedJpeg, CodecError> {
        let image = decode(source)?;
        self.encode(&image)
    }

    /// Encode a pixel buffer as JPEG. Grayscale input stays grayscale,
    /// everything else becomes RGB; alpha is dropped.
    pub fn encode(&self, image: &DynamicImage) -> Result<EncodedJpeg, CodecError> {
        let mut data = Vec::new();
        let (width, height, color) = {
            let mut encoder = JpegEncoder::new_with_quality(&mut data, self.quality.get());
            if image.color().has_color() {
                let rgb = image.to_rgb8();
                encoder.encode_image(&rgb).map_err(CodecError::Encode)?;
                (rgb.width(), rgb.height(), JpegColor::Rgb)
            } else {
                let gray = image.to_luma8();
                encoder.encode_image(&gray).map_err(CodecError::Encode)?;
                (gray.width(), gray.height(), JpegColor::Gray)
            }
        };

        Ok(EncodedJpeg {
            data,
            width,
            height,
            color,
        })
    }
}

/// Decode an image source into a pixel buffer.
pub fn decode(source: &ImageSource) -> Result<DynamicImage, CodecError> {
    match source {
        ImageSource::Encoded(bytes) => image::load_from_memory(bytes).map_err(CodecError::Decode),
        ImageSource::Raw {
            width,
            height,
            color,
            samples,
        } => {
            let expected = *width as usize * *height as usize * color.components();
            // Any other length means the stream layout was misread
            if samples.len() != expected {
                return Err(CodecError::Unsupported(format!(
                    "{}x{} image needs {} sample bytes, stream has {}",
                    width,
                    height,
                    expected,
                    samples.len()
                )));
            }
            let samples = samples.clone();
            let image = match color {
                RawColor::Gray => {
                    GrayImage::from_raw(*width, *height, samples).map(DynamicImage::ImageLuma8)
                }
                RawColor::Rgb => {
                    RgbImage::from_raw(*width, *height, samples).map(DynamicImage::ImageRgb8)
                }
            };
            image.ok_or_else(|| CodecError::Unsupported("sample buffer size mismatch".to_string()))
        }
    }
}

/// Re-encode arbitrary encoded image bytes as JPEG at `quality`.
pub fn recompress(raw_bytes: &[u8], quality: Quality) -> Result<Vec<u8>, CodecError> {
    ImageCodec::new(quality)
        .recompress(&ImageSource::Encoded(raw_bytes.to_vec()))
        .map(|jpeg| jpeg.data)
}
