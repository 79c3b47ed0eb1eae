//! Integration tests for scripted sessions.

use pdfbuilder::config::PreviewLayout;
use pdfbuilder::error::BuilderError;
use pdfbuilder::render::Previewer;
use pdfbuilder::session::{Outcome, Session};
use tempfile::TempDir;

use crate::common::{load, page_widths, write_pdf, write_png};

async fn run_script(session: &mut Session, script: &str) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for line in script.lines() {
        if let Some(outcome) = session.execute_line(line).await.unwrap() {
            outcomes.push(outcome);
        }
    }
    outcomes
}

#[tokio::test]
async fn test_script_edits_and_saves() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "doc.pdf", 3, 300);
    let png = write_png(dir.path(), "cover.png", 96, 96);
    let out = dir.path().join("out.pdf");

    let script = format!(
        "# build an album\n\
         add {} {}\n\
         top 4\n\
         down 1\n\
         remove 4\n\
         list\n\
         save {}\n\
         list\n",
        pdf.display(),
        png.display(),
        out.display()
    );

    let mut session = Session::default();
    let outcomes = run_script(&mut session, &script).await;

    let Outcome::Listed(before) = &outcomes[4] else {
        panic!("expected a list, got {:?}", outcomes[4]);
    };
    assert_eq!(before, &["doc.pdf-1", "cover.png", "doc.pdf-2"]);
    assert!(matches!(outcomes[5], Outcome::Saved { .. }));

    let Outcome::Listed(after) = &outcomes[6] else {
        panic!("expected a list");
    };
    assert!(after.is_empty());

    assert_eq!(page_widths(&load(&out)), vec![300, 72, 301]);
}

#[tokio::test]
async fn test_boundary_moves_are_no_ops() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "doc.pdf", 2, 300);

    let mut session = Session::default();
    let script = format!("add {}\nup 1\ndown 2\nlist\n", pdf.display());
    let outcomes = run_script(&mut session, &script).await;

    assert!(matches!(outcomes[1], Outcome::Moved { to: 0, .. }));
    assert!(matches!(outcomes[2], Outcome::Moved { to: 1, .. }));
    let Outcome::Listed(labels) = &outcomes[3] else {
        panic!("expected a list");
    };
    assert_eq!(labels, &["doc.pdf-1", "doc.pdf-2"]);
}

#[tokio::test]
async fn test_out_of_range_position_reports_one_based() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "a.png", 4, 4);

    let mut session = Session::default();
    session
        .execute_line(&format!("add {}", png.display()))
        .await
        .unwrap();

    let err = session.execute_line("remove 5").await.unwrap_err();
    assert!(matches!(err, BuilderError::IndexOutOfBounds { index: 4, len: 1 }));
    assert_eq!(
        err.to_string(),
        "Position 5 is out of range (the list has 1 page(s))"
    );
    assert_eq!(session.collection().len(), 1);
}

#[tokio::test]
async fn test_preview_command_renders_pdf_and_images() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "doc.pdf", 2, 300);
    let png = write_png(dir.path(), "a.png", 50, 20);
    let previews = dir.path().join("previews");

    let layout = PreviewLayout {
        width: 67,
        height: 95,
        divider: 3,
    };
    let mut session = Session::default().with_previewer(Previewer::new(layout));
    let script = format!(
        "add {} {}\npreview {}\n",
        pdf.display(),
        png.display(),
        previews.display()
    );
    let outcomes = run_script(&mut session, &script).await;

    assert!(matches!(
        outcomes[1],
        Outcome::PreviewsWritten { written: 3, ref failed } if failed.is_empty()
    ));
    for name in ["page-001.png", "page-002.png", "page-003.png"] {
        let preview = image::open(previews.join(name)).unwrap();
        assert_eq!((preview.width(), preview.height()), (67, 95));
    }
}

#[tokio::test]
async fn test_failed_save_keeps_pages() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "a.png", 4, 4);
    let out = dir.path().join("missing").join("out.pdf");

    let mut session = Session::default();
    session
        .execute_line(&format!("add {}", png.display()))
        .await
        .unwrap();

    let err = session
        .execute_line(&format!("save {}", out.display()))
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::InvalidConfig { .. }));
    assert_eq!(session.collection().len(), 1);
}
