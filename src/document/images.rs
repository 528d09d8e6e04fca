//! Embedded image resources: reading them out and writing JPEGs back.

use std::fmt;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::codec::{EncodedJpeg, ImageSource, RawColor};
use crate::error::{CodecError, CompressError};

use super::page::resolve;

/// Identifies one image XObject by its object id (xref)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageRef {
    pub id: ObjectId,
}

impl ImageRef {
    pub fn new(id: ObjectId) -> Self {
        Self { id }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xref {} {}", self.id.0, self.id.1)
    }
}

/// Filters that hand the codec something it cannot decode
const UNSUPPORTED_FILTERS: [&[u8]; 3] = [b"JPXDecode", b"JBIG2Decode", b"CCITTFaxDecode"];

fn filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// `/Predictor` of every decode parameter dictionary (one dict, or an array
/// aligned with the filters)
fn predictors(doc: &Document, dict: &Dictionary) -> Vec<i64> {
    let Some(parms) = dict
        .get(b"DecodeParms")
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
    else {
        return Vec::new();
    };
    let entries: Vec<&Object> = match parms {
        Object::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    entries
        .into_iter()
        .filter_map(|entry| resolve(doc, entry).ok()?.as_dict().ok())
        .filter_map(|parms| parms.get(b"Predictor").and_then(Object::as_i64).ok())
        .collect()
}

/// lopdf only reverses PNG predictors (10-15) when decompressing
fn predictor_reversible(predictor: i64) -> bool {
    predictor == 1 || (10..=15).contains(&predictor)
}

fn unsupported(message: impl Into<String>) -> CodecError {
    CodecError::Unsupported(message.into())
}

/// Number of color components for the color spaces the codec understands.
/// `None` for anything else (Indexed, Separation, DeviceN, Lab, ...).
fn components(doc: &Document, color_space: &Object) -> Option<usize> {
    let color_space = resolve(doc, color_space).ok()?;
    let family = match color_space {
        Object::Name(name) => name.as_slice(),
        Object::Array(items) => items.first()?.as_name().ok()?,
        _ => return None,
    };

    match family {
        b"DeviceGray" | b"CalGray" | b"G" => Some(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        b"ICCBased" => {
            let Object::Array(items) = color_space else {
                return None;
            };
            let profile = resolve(doc, items.get(1)?).ok()?.as_stream().ok()?;
            let n = profile.dict.get(b"N").ok()?.as_i64().ok()?;
            usize::try_from(n).ok()
        }
        _ => None,
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32, CodecError> {
    dict.get(key)
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            unsupported(format!(
                "missing or invalid /{}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// Read an image XObject into something the codec can decode.
pub(crate) fn extract(doc: &Document, image: ImageRef) -> Result<ImageSource, CodecError> {
    let stream = doc
        .get_object(image.id)
        .and_then(Object::as_stream)
        .map_err(|e| unsupported(format!("{image} is not a stream: {e}")))?;
    let dict = &stream.dict;

    let is_image = dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .map(|n| n == b"Image")
        .unwrap_or(false);
    if !is_image {
        return Err(unsupported(format!("{image} is not an image XObject")));
    }
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Err(unsupported("stencil masks are left alone"));
    }
    if dict.has(b"Decode") {
        return Err(unsupported("images with a /Decode array are left alone"));
    }
    // Color-key masking needs exact sample values, which JPEG cannot keep
    if matches!(dict.get(b"Mask"), Ok(Object::Array(_))) {
        return Err(unsupported("images with a color-key /Mask are left alone"));
    }

    let filters = filters(dict);
    if let Some(filter) = filters
        .iter()
        .find(|f| UNSUPPORTED_FILTERS.contains(&f.as_slice()))
    {
        return Err(unsupported(format!(
            "{} data is not decodable",
            String::from_utf8_lossy(filter)
        )));
    }

    if !filters.is_empty() {
        if let Some(predictor) = predictors(doc, dict)
            .into_iter()
            .find(|p| !predictor_reversible(*p))
        {
            return Err(unsupported(format!("predictor {predictor} is not supported")));
        }
    }

    let color = dict.get(b"ColorSpace").ok().and_then(|cs| components(doc, cs));

    if filters.last().map(Vec::as_slice) == Some(b"DCTDecode".as_slice()) {
        if color == Some(4) {
            return Err(unsupported("CMYK JPEG"));
        }
        let data = if filters.len() > 1 {
            // Outer filters (usually Flate) wrap the JPEG; peel them off.
            decoded_content(stream)?
        } else {
            stream.content.clone()
        };
        return Ok(ImageSource::Encoded(data));
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(unsupported(format!("{bits} bits per component")));
    }

    let color = match color {
        Some(1) => RawColor::Gray,
        Some(3) => RawColor::Rgb,
        _ => return Err(unsupported("unsupported color space")),
    };

    Ok(ImageSource::Raw {
        width: dimension(dict, b"Width")?,
        height: dimension(dict, b"Height")?,
        color,
        samples: if filters.is_empty() {
            stream.content.clone()
        } else {
            decoded_content(stream)?
        },
    })
}

fn decoded_content(stream: &Stream) -> Result<Vec<u8>, CodecError> {
    stream
        .decompressed_content()
        .map_err(|e| unsupported(format!("cannot decompress image stream: {e}")))
}

/// Replace an image XObject's data with `jpeg`, rewriting the dictionary
/// entries that describe the encoding. Everything else (SMask, Interpolate,
/// metadata) is kept.
pub(crate) fn replace_with_jpeg(
    doc: &mut Document,
    image: ImageRef,
    jpeg: &EncodedJpeg,
) -> Result<(), CompressError> {
    let stream = doc
        .get_object_mut(image.id)
        .and_then(Object::as_stream_mut)
        .map_err(|_| CompressError::NotAnImage(image.id))?;

    let dict = &mut stream.dict;
    dict.set("Filter", "DCTDecode");
    dict.set("Width", i64::from(jpeg.width));
    dict.set("Height", i64::from(jpeg.height));
    dict.set("ColorSpace", jpeg.color.color_space());
    dict.set("BitsPerComponent", 8_i64);
    dict.remove(b"DecodeParms");
    stream.set_content(jpeg.data.clone());
    Ok(())
}

/// New image XObject stream holding `jpeg`
pub(crate) fn jpeg_xobject(jpeg: &EncodedJpeg) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(jpeg.width),
        "Height" => i64::from(jpeg.height),
        "ColorSpace" => jpeg.color.color_space(),
        "BitsPerComponent" => 8_i64,
        "Filter" => "DCTDecode",
    };
    Stream::new(dict, jpeg.data.clone())
}
