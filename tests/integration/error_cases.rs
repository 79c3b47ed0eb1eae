//! Integration tests for error handling and edge cases.

use pdfbuilder::collection::PageCollection;
use pdfbuilder::config::OverwriteMode;
use pdfbuilder::error::BuilderError;
use pdfbuilder::io::PdfWriter;
use pdfbuilder::render::Exporter;
use pdfbuilder::session::Session;
use pdfbuilder::source::PageSource;
use tempfile::TempDir;

use crate::common::{write_pdf, write_png};

#[tokio::test]
async fn test_corrupted_pdf_is_rejected() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.pdf");
    std::fs::write(&broken, b"%PDF-1.5\nthis is not a pdf").unwrap();

    let err = PageCollection::new().add_path(&broken).await.unwrap_err();

    assert!(matches!(err, BuilderError::FailedToLoadPdf { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_bad_files_do_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let good = write_pdf(dir.path(), "good.pdf", 2, 300);
    let text = dir.path().join("readme.md");
    std::fs::write(&text, "# hi").unwrap();
    let undecodable = dir.path().join("fake.png");
    std::fs::write(&undecodable, b"not an image").unwrap();

    let mut pages = PageCollection::new();
    let report = pages
        .add_paths(&[text, good, undecodable.clone()])
        .await
        .unwrap();

    // Images are only decoded when previewed or exported.
    assert_eq!(report.added, 3);
    assert_eq!(report.rejected.len(), 1);
    assert!(matches!(report.rejected[0], BuilderError::InvalidExtension { .. }));

    let err = Exporter::default()
        .build(&pages.sources())
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::ImageDecode { .. }));
}

#[tokio::test]
async fn test_source_file_removed_before_export() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "gone.pdf", 1, 300);

    let mut pages = PageCollection::new();
    pages.add_path(&pdf).await.unwrap();
    std::fs::remove_file(&pdf).unwrap();

    let err = Exporter::default()
        .build(&pages.sources())
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_nothing_to_export() {
    let err = Exporter::default().build(&[]).await.unwrap_err();
    assert!(matches!(err, BuilderError::NothingToExport));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_output_exists_under_no_clobber() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "a.png", 4, 4);
    let out = dir.path().join("out.pdf");
    std::fs::write(&out, b"keep me").unwrap();

    let mut session = Session::default().with_overwrite_mode(OverwriteMode::NoClobber);
    session.collection_mut().push(PageSource::image(&png));

    let err = session.save(&out).await.unwrap_err();
    assert!(matches!(err, BuilderError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(&out).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_force_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "a.png", 4, 4);
    let out = dir.path().join("out.pdf");
    std::fs::write(&out, b"old").unwrap();

    let mut session = Session::default()
        .with_overwrite_mode(OverwriteMode::Force)
        .with_writer(PdfWriter::non_atomic());
    session.collection_mut().push(PageSource::image(&png));
    session.save(&out).await.unwrap();

    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_page_index_past_end() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "short.pdf", 2, 300);

    let err = Exporter::default()
        .build(&[PageSource::pdf_page(&pdf, 2)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BuilderError::PageNotFound {
            index: 2,
            page_count: 2,
            ..
        }
    ));
}
