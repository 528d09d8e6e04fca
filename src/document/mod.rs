//! Document handle over lopdf
//!
//! Owns one parsed PDF for the duration of a run. Pages are addressed by
//! zero-based index in document order; images by [`ImageRef`].

mod images;
mod page;

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::codec::{EncodedJpeg, ImageSource};
use crate::error::{CodecError, CompressError};

pub use images::ImageRef;
pub use page::PageRect;

use page::resolve;

pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open and parse a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CompressError> {
        let path = path.as_ref();
        let inner = Document::load(path).map_err(|source| CompressError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lopdf(inner))
    }

    /// Parse a PDF held in memory.
    pub fn load_mem(bytes: &[u8]) -> Result<Self, CompressError> {
        Ok(Self::from_lopdf(Document::load_mem(bytes)?))
    }

    /// An empty document with a page tree and catalog, ready for `new_page`.
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0_i64,
            }),
        );
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);
        Self::from_lopdf(inner)
    }

    fn from_lopdf(inner: Document) -> Self {
        let page_ids = inner.get_pages().values().copied().collect();
        Self {
            inner,
            page_ids,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, CompressError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(CompressError::PageOutOfRange(index + 1))
    }

    /// Visible rectangle of a page, in points
    pub fn page_geometry(&self, index: usize) -> Result<PageRect, CompressError> {
        page::page_geometry(&self.inner, self.page_id(index)?, index)
    }

    /// Distinct image XObjects drawn by a page
    pub fn page_images(&self, index: usize) -> Result<Vec<ImageRef>, CompressError> {
        page::page_images(&self.inner, self.page_id(index)?)
    }

    /// Raw data of an embedded image, ready for the codec
    pub fn extract_image(&self, image: ImageRef) -> Result<ImageSource, CodecError> {
        images::extract(&self.inner, image)
    }

    /// Replace an embedded image's data in the shared resource table.
    /// Every page referencing it sees the new image.
    pub fn update_image(&mut self, image: ImageRef, jpeg: &EncodedJpeg) -> Result<(), CompressError> {
        images::replace_with_jpeg(&mut self.inner, image, jpeg)
    }

    fn page_tree_root(&self) -> Result<ObjectId, CompressError> {
        let root = self.inner.trailer.get(b"Root")?.as_reference()?;
        Ok(self
            .inner
            .get_object(root)?
            .as_dict()?
            .get(b"Pages")?
            .as_reference()?)
    }

    /// Append an empty page of the given size, returning its index.
    pub fn new_page(&mut self, width: f32, height: f32) -> Result<usize, CompressError> {
        let pages_id = self.page_tree_root()?;
        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0_i64.into(),
                0_i64.into(),
                Object::Real(width.into()),
                Object::Real(height.into()),
            ],
            "Resources" => Dictionary::new(),
        });

        let pages = self.inner.get_object_mut(pages_id)?.as_dict_mut()?;
        let mut kids = pages
            .get(b"Kids")
            .and_then(Object::as_array)
            .cloned()
            .unwrap_or_default();
        kids.push(page_id.into());
        let count = kids.len() as i64;
        pages.set("Kids", kids);
        pages.set("Count", count);

        self.page_ids.push(page_id);
        Ok(self.page_ids.len() - 1)
    }

    /// Draw `jpeg` on a page so that it exactly fills `rect`.
    pub fn insert_image(
        &mut self,
        index: usize,
        rect: PageRect,
        jpeg: &EncodedJpeg,
    ) -> Result<ImageRef, CompressError> {
        let page_id = self.page_id(index)?;
        let image_id = self.inner.add_object(images::jpeg_xobject(jpeg));

        let mut resources = match page::resolve_inherited(&self.inner, page_id, b"Resources")? {
            Some(obj) => resolve(&self.inner, obj)?.as_dict()?.clone(),
            None => Dictionary::new(),
        };
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => resolve(&self.inner, obj)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        let name = (1..)
            .map(|n| format!("Im{n}"))
            .find(|name| !xobjects.has(name.as_bytes()))
            .unwrap_or_else(|| "Im0".to_string());
        xobjects.set(name.as_bytes(), image_id);
        resources.set("XObject", xobjects);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(rect.width.into()),
                        0_i64.into(),
                        0_i64.into(),
                        Object::Real(rect.height.into()),
                        Object::Real(rect.x.into()),
                        Object::Real(rect.y.into()),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let page = self.inner.get_object_mut(page_id)?.as_dict_mut()?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Reference(existing)) => {
                Object::Array(vec![Object::Reference(*existing), content_id.into()])
            }
            Ok(Object::Array(existing)) => {
                let mut all = existing.clone();
                all.push(content_id.into());
                Object::Array(all)
            }
            _ => content_id.into(),
        };
        page.set("Contents", contents);
        page.set("Resources", resources);

        Ok(ImageRef::new(image_id))
    }

    /// Save with structural cleanup: drop unreferenced objects, compact the
    /// cross-reference table and deflate every unfiltered stream.
    /// Returns the size of the written file in bytes.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<u64, CompressError> {
        let path = path.as_ref();
        let pruned = self.inner.prune_objects();
        log::debug!("Pruned {} unreferenced objects", pruned.len());
        self.inner.delete_zero_length_streams();
        self.inner.renumber_objects();
        self.inner.compress();

        self.inner.save(path)?;
        // Object ids changed during renumbering
        self.page_ids = self.inner.get_pages().values().copied().collect();

        Ok(fs::metadata(path)?.len())
    }

    /// Underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
