use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Failed to open PDF {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("PDF structure error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Page {0} is out of range")]
    PageOutOfRange(usize),

    #[error("Page {page} has no usable page box: {message}")]
    PageGeometry { page: usize, message: String },

    #[error("Object {0:?} is not an image stream")]
    NotAnImage(lopdf::ObjectId),

    #[error("No page rasterizer available: {0}")]
    RasterizerUnavailable(String),

    #[error("Failed to rasterize page {page}: {message}")]
    Rasterize { page: usize, message: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Unsupported image data: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The file '{}' was not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error("Custom quality must be an integer between 1 and 95 (got {0}).")]
    QualityOutOfRange(i64),

    #[error("Rasterization DPI must be a positive number (got {0}).")]
    InvalidDpi(f32),

    #[error("Could not create output directory {}. {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
