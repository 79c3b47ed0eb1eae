//! Fixture generators for the integration tests.
//!
//! Every PDF page gets a distinct MediaBox width, so page order in an
//! output document can be checked without text extraction.

#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

use pdfbuilder::render::pages::page_dimensions;

/// Write a PDF whose page `i` (zero-based) is `base_width + i` points wide
/// and 500 points tall.
pub fn write_pdf(dir: &Path, name: &str, pages: usize, base_width: i64) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for i in 0..pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            format!("0 0 m {} 500 l S", base_width + i as i64).into_bytes(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (base_width + i as i64).into(), 500.into()],
            "Contents" => content_id,
            "Resources" => Dictionary::new(),
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write an opaque PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([200, 40, 40]))
        .save(&path)
        .unwrap();
    path
}

/// Write a PNG that is transparent on its left half.
pub fn write_transparent_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([10, 120, 200, alpha])
    })
    .save(&path)
    .unwrap();
    path
}

/// Write a JPEG.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([30, 160, 90]))
        .save(&path)
        .unwrap();
    path
}

/// Page ids of `doc` in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Rounded page widths of `doc` in page order.
pub fn page_widths(doc: &Document) -> Vec<i64> {
    page_ids(doc)
        .into_iter()
        .map(|id| page_dimensions(doc, id).0.round() as i64)
        .collect()
}

/// Load a saved PDF.
pub fn load(path: &Path) -> Document {
    Document::load(path).unwrap()
}
