//! Integration tests for adding, reordering and exporting pages.

use lopdf::Object;
use pdfbuilder::collection::PageCollection;
use pdfbuilder::config::{CompressionLevel, Metadata, PageSize};
use pdfbuilder::io::PdfWriter;
use pdfbuilder::render::metadata::read_info;
use pdfbuilder::render::{ExportOptions, Exporter};
use pdfbuilder::source::PageSource;
use pdfbuilder::utils::expand_inputs;
use tempfile::TempDir;

use crate::common::{load, page_ids, page_widths, write_jpeg, write_pdf, write_png, write_transparent_png};

fn options(page_size: PageSize) -> ExportOptions {
    ExportOptions {
        page_size,
        ..ExportOptions::default()
    }
}

#[tokio::test]
async fn test_export_follows_collection_order() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "report.pdf", 3, 300);
    // 96 x 48 pixels at 96 DPI is 72 x 36 points.
    let png = write_png(dir.path(), "cover.png", 96, 48);
    let out = dir.path().join("out.pdf");

    let mut pages = PageCollection::new();
    let report = pages.add_paths(&[pdf, png]).await.unwrap();
    assert_eq!(report.added, 4);
    assert!(report.is_complete());

    pages.move_to_top(3).unwrap();
    pages.move_to(3, 1).unwrap();
    pages.remove(2).unwrap();
    assert_eq!(pages.labels(), vec!["cover.png", "report.pdf-3", "report.pdf-2"]);

    let (export, write) = Exporter::default()
        .export_to(&pages.sources(), &out, &PdfWriter::new())
        .await
        .unwrap();

    assert_eq!(export.total_pages, 3);
    assert_eq!(write.output_path, out);
    assert_eq!(page_widths(&load(&out)), vec![72, 302, 301]);
}

#[tokio::test]
async fn test_export_interleaves_pages_from_several_pdfs() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2, 300);
    let b = write_pdf(dir.path(), "b.pdf", 2, 600);

    let sources = vec![
        PageSource::pdf_page(&b, 1),
        PageSource::pdf_page(&a, 0),
        PageSource::pdf_page(&b, 0),
        PageSource::pdf_page(&a, 1),
    ];
    let (doc, stats) = Exporter::default().build(&sources).await.unwrap();

    assert_eq!(stats.source_pdfs, 2);
    assert_eq!(page_widths(&doc), vec![601, 300, 600, 301]);
}

#[tokio::test]
async fn test_unused_pages_are_dropped() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "big.pdf", 5, 300);

    let (doc, _) = Exporter::default()
        .build(&[PageSource::pdf_page(&pdf, 3)])
        .await
        .unwrap();

    let page_objects = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|dict| matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Page"))
        .count();
    assert_eq!(page_objects, 1);
    assert_eq!(page_widths(&doc), vec![303]);
}

#[tokio::test]
async fn test_same_page_used_twice() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "one.pdf", 1, 400);
    let out = dir.path().join("out.pdf");

    let sources = vec![PageSource::pdf_page(&pdf, 0); 3];
    Exporter::default()
        .export_to(&sources, &out, &PdfWriter::new())
        .await
        .unwrap();

    let doc = load(&out);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 3);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_eq!(page_widths(&doc), vec![400, 400, 400]);
}

#[tokio::test]
async fn test_fixed_page_sizes() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "wide.png", 300, 100);
    let sources = [PageSource::image(&png)];

    let (doc, _) = Exporter::new(options(PageSize::A4)).build(&sources).await.unwrap();
    assert_eq!(page_widths(&doc), vec![595]);

    let (doc, _) = Exporter::new(options(PageSize::Preview))
        .build(&sources)
        .await
        .unwrap();
    let id = page_ids(&doc)[0];
    assert_eq!(
        pdfbuilder::render::pages::page_dimensions(&doc, id),
        (670.0, 950.0)
    );
}

#[tokio::test]
async fn test_images_are_embedded_as_rgb_xobjects() {
    let dir = TempDir::new().unwrap();
    let png = write_transparent_png(dir.path(), "alpha.png", 8, 6);
    let jpg = write_jpeg(dir.path(), "photo.jpg", 10, 10);

    let options = ExportOptions {
        compression: CompressionLevel::Maximum,
        ..ExportOptions::default()
    };
    let (doc, stats) = Exporter::new(options)
        .build(&[PageSource::image(&png), PageSource::image(&jpg)])
        .await
        .unwrap();
    assert_eq!(stats.image_pages, 2);

    let images: Vec<_> = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image"))
        .collect();
    assert_eq!(images.len(), 2);

    for image in images {
        let color_space = image.dict.get(b"ColorSpace").unwrap().as_name().unwrap();
        assert_eq!(color_space, b"DeviceRGB");
        assert!(image.dict.get(b"SMask").is_err());
    }
}

#[tokio::test]
async fn test_metadata_survives_save() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "a.png", 4, 4);
    let out = dir.path().join("out.pdf");

    let metadata = Metadata::new(
        Some("Café – Été".to_string()),
        Some("Someone".to_string()),
        None,
        None,
    );
    let options = ExportOptions {
        metadata: metadata.clone(),
        ..ExportOptions::default()
    };
    Exporter::new(options)
        .export_to(&[PageSource::image(&png)], &out, &PdfWriter::new())
        .await
        .unwrap();

    let doc = load(&out);
    assert_eq!(read_info(&doc), metadata);

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let title = doc.get_dictionary(info_id).unwrap().get(b"Title").unwrap();
    assert_eq!(lopdf::decode_text_string(title).unwrap(), "Café – Été");
}

#[tokio::test]
async fn test_png_with_jpeg_extension_exports() {
    let dir = TempDir::new().unwrap();
    // PNG bytes behind a .jpg name.
    let misnamed = write_png(dir.path(), "scan.png", 96, 48);
    let renamed = dir.path().join("scan.jpg");
    std::fs::rename(&misnamed, &renamed).unwrap();
    let out = dir.path().join("out.pdf");

    let mut pages = PageCollection::new();
    assert_eq!(pages.add_path(&renamed).await.unwrap(), 1);

    Exporter::default()
        .export_to(&pages.sources(), &out, &PdfWriter::new())
        .await
        .unwrap();

    assert_eq!(page_widths(&load(&out)), vec![72]);
}

#[tokio::test]
async fn test_directory_input_is_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    let scans = dir.path().join("scans");
    std::fs::create_dir(&scans).unwrap();
    write_png(&scans, "b.png", 4, 4);
    write_pdf(&scans, "a.pdf", 2, 300);
    std::fs::write(scans.join("notes.txt"), "ignored").unwrap();

    let paths = expand_inputs(&[scans]).unwrap();
    let mut pages = PageCollection::new();
    let report = pages.add_paths(&paths).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(pages.labels(), vec!["a.pdf-1", "a.pdf-2", "b.png"]);
}

#[tokio::test]
async fn test_glob_input() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "p1.png", 4, 4);
    write_png(dir.path(), "p2.png", 4, 4);
    write_jpeg(dir.path(), "other.jpg", 4, 4);

    let pattern = dir.path().join("p*.png");
    let paths = expand_inputs(&[pattern]).unwrap();
    let mut pages = PageCollection::new();
    pages.add_paths(&paths).await.unwrap();

    assert_eq!(pages.labels(), vec!["p1.png", "p2.png"]);
}
