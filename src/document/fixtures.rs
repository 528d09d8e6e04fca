//! Small PDFs assembled in memory for unit tests.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Deterministic noisy gradient; noise keeps JPEG sizes realistic.
pub fn noisy_rgb(width: u32, height: u32) -> RgbImage {
    let mut seed: u32 = 0x9E37_79B9;
    RgbImage::from_fn(width, height, |x, y| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (seed >> 24) as u8 / 4;
        Rgb([
            (x % 256) as u8 / 2 + noise,
            (y % 256) as u8 / 2 + noise,
            ((x * y) % 256) as u8 / 2,
        ])
    })
}

pub fn jpeg_bytes(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .unwrap();
    out
}

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn add_image_stream(&mut self, dict: Dictionary, content: Vec<u8>) -> ObjectId {
        self.doc.add_object(Stream::new(dict, content))
    }

    pub fn jpeg_image(&mut self, image: &RgbImage, quality: u8) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        };
        self.add_image_stream(dict, jpeg_bytes(image, quality))
    }

    /// DCTDecode stream whose bytes no decoder accepts
    pub fn corrupt_jpeg(&mut self) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 10_i64,
            "Height" => 10_i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        };
        self.add_image_stream(dict, b"\xFF\xD8\xFF\xE0 truncated garbage".to_vec())
    }

    pub fn flate_rgb_image(&mut self, image: &RgbImage) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };
        let mut stream = Stream::new(dict, image.as_raw().clone());
        stream.compress().unwrap();
        self.doc.add_object(stream)
    }

    /// Flate RGB image stored with the TIFF predictor (horizontal differencing)
    pub fn tiff_predicted_rgb_image(&mut self, image: &RgbImage) -> ObjectId {
        let row = image.width() as usize * 3;
        let mut samples = image.as_raw().clone();
        for line in samples.chunks_mut(row) {
            for i in (3..row).rev() {
                line[i] = line[i].wrapping_sub(line[i - 3]);
            }
        }
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "FlateDecode",
            "DecodeParms" => dictionary! {
                "Predictor" => 2_i64,
                "Colors" => 3_i64,
                "Columns" => i64::from(image.width()),
                "BitsPerComponent" => 8_i64,
            },
        };
        self.add_image_stream(dict, zlib(&samples))
    }

    /// Uncompressed RGB image with a color-key mask
    pub fn color_keyed_rgb_image(&mut self, image: &RgbImage) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Mask" => [0_i64, 10, 0, 10, 0, 10].map(Object::Integer).to_vec(),
        };
        self.add_image_stream(dict, image.as_raw().clone())
    }

    pub fn stencil_mask(&mut self, width: i64, height: i64) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ImageMask" => true,
            "BitsPerComponent" => 1_i64,
        };
        let row = ((width + 7) / 8) as usize;
        self.add_image_stream(dict, vec![0xAA; row * height as usize])
    }

    pub fn form_with_images(&mut self, images: &[ObjectId]) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0_i64.into(), 0_i64.into(), 100_i64.into(), 100_i64.into()],
            "Resources" => dictionary! { "XObject" => xobject_dict(images) },
        };
        self.doc
            .add_object(Stream::new(dict, draw_ops(images.len()).into_bytes()))
    }

    /// US Letter page drawing `images` (may include forms)
    pub fn page(&mut self, images: &[ObjectId]) -> ObjectId {
        self.page_inner([0.0, 0.0, 612.0, 792.0], 0, images)
    }

    pub fn page_with_box(&mut self, media_box: [f32; 4], rotate: i64) -> ObjectId {
        self.page_inner(media_box, rotate, &[])
    }

    fn page_inner(&mut self, media_box: [f32; 4], rotate: i64, images: &[ObjectId]) -> ObjectId {
        let content_id = self.doc.add_object(Stream::new(
            Dictionary::new(),
            draw_ops(images.len()).into_bytes(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box.iter().map(|v| Object::Real((*v).into())).collect::<Vec<_>>(),
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobject_dict(images) },
        };
        if rotate != 0 {
            page.set("Rotate", rotate);
        }
        let id = self.doc.add_object(page);
        self.kids.push(id.into());
        id
    }

    pub fn finish(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).unwrap();
        buf
    }
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn xobject_dict(images: &[ObjectId]) -> Dictionary {
    let mut dict = Dictionary::new();
    for (i, id) in images.iter().enumerate() {
        dict.set(format!("X{i}"), *id);
    }
    dict
}

fn draw_ops(count: usize) -> String {
    (0..count)
        .map(|i| format!("q 100 0 0 100 0 {} cm /X{} Do Q\n", i * 110, i))
        .collect()
}
