//! Page geometry and image discovery over the lopdf object tree.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::CompressError;

use super::images::ImageRef;

/// Page rectangle in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageRect {
    /// Rectangle anchored at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Pixel dimensions of this rectangle rendered at `dpi`
    pub fn pixel_size(&self, dpi: f32) -> (u32, u32) {
        let scale = dpi / 72.0;
        let w = (self.width * scale).round().max(1.0) as u32;
        let h = (self.height * scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Follow a single indirect reference.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Look up a key on the page, walking up `/Parent` links for inheritable
/// attributes. Returns `None` if no ancestor defines it.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> lopdf::Result<Option<&'a Object>> {
    let mut current = page_id;
    let mut visited = HashSet::new();
    while visited.insert(current) {
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Ok(None)
}

fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<PageRect> {
    let obj = resolve_inherited(doc, page_id, key).ok()??;
    let array = resolve(doc, obj).ok()?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let values: Vec<f32> = array.iter().filter_map(number).collect();
    if values.len() != 4 {
        return None;
    }
    let (x0, x1) = (values[0].min(values[2]), values[0].max(values[2]));
    let (y0, y1) = (values[1].min(values[3]), values[1].max(values[3]));
    Some(PageRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Visible page rectangle: CropBox if present, else MediaBox, with width and
/// height swapped for pages rotated a quarter turn.
pub(crate) fn page_geometry(
    doc: &Document,
    page_id: ObjectId,
    index: usize,
) -> Result<PageRect, CompressError> {
    let rect = page_box(doc, page_id, b"CropBox")
        .or_else(|| page_box(doc, page_id, b"MediaBox"))
        .ok_or_else(|| CompressError::PageGeometry {
            page: index + 1,
            message: "neither CropBox nor MediaBox is a 4-number array".to_string(),
        })?;

    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(CompressError::PageGeometry {
            page: index + 1,
            message: format!("empty page box {}x{}", rect.width, rect.height),
        });
    }

    let rotation = resolve_inherited(doc, page_id, b"Rotate")?
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);

    if rotation == 90 || rotation == 270 {
        Ok(PageRect {
            x: rect.y,
            y: rect.x,
            width: rect.height,
            height: rect.width,
        })
    } else {
        Ok(rect)
    }
}

fn subtype_is(dict: &Dictionary, name: &[u8]) -> bool {
    dict.get(b"Subtype")
        .and_then(Object::as_name)
        .map(|n| n == name)
        .unwrap_or(false)
}

/// Image XObjects reachable from the page's resources, including those
/// drawn inside Form XObjects. Each image appears once, in discovery order.
pub(crate) fn page_images(doc: &Document, page_id: ObjectId) -> Result<Vec<ImageRef>, CompressError> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();
    let mut visited_forms = HashSet::new();

    if let Some(resources) = resolve_inherited(doc, page_id, b"Resources")? {
        collect_images(doc, resources, &mut images, &mut seen, &mut visited_forms);
    }
    Ok(images)
}

fn collect_images(
    doc: &Document,
    resources: &Object,
    images: &mut Vec<ImageRef>,
    seen: &mut HashSet<ObjectId>,
    visited_forms: &mut HashSet<ObjectId>,
) {
    let Some(xobjects) = resolve(doc, resources)
        .and_then(Object::as_dict)
        .and_then(|res| res.get(b"XObject"))
        .and_then(|xobj| resolve(doc, xobj))
        .and_then(Object::as_dict)
        .ok()
    else {
        return;
    };

    for (_, entry) in xobjects.iter() {
        let Object::Reference(id) = entry else {
            continue;
        };
        let Ok(stream) = doc.get_object(*id).and_then(Object::as_stream) else {
            log::debug!("XObject {:?} is missing or not a stream", id);
            continue;
        };

        if subtype_is(&stream.dict, b"Image") {
            if seen.insert(*id) {
                images.push(ImageRef::new(*id));
            }
        } else if subtype_is(&stream.dict, b"Form") && visited_forms.insert(*id) {
            if let Ok(form_resources) = stream.dict.get(b"Resources") {
                collect_images(doc, form_resources, images, seen, visited_forms);
            }
        }
    }
}
