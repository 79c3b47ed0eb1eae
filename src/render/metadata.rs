//! Document Info dictionary.
//!
//! The exported document always gets a fresh Info dictionary with
//! `Creator`, `Producer` and `CreationDate`; user supplied title, author,
//! subject and keywords are added when present.

use crate::config::Metadata;
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, decode_text_string, text_string};

/// Write a new Info dictionary to `doc` and link it from the trailer.
///
/// Text values are PDFDocEncoding when ASCII, UTF-16BE with a BOM otherwise.
pub fn write_info(doc: &mut Document, metadata: &Metadata) {
    let mut info = Dictionary::new();

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }

    let producer = format!("{} {}", crate::NAME, crate::VERSION);
    info.set("Creator", text_string(crate::NAME));
    info.set("Producer", text_string(&producer));

    let now = format_pdf_date(Utc::now());
    info.set("CreationDate", text_string(&now));
    info.set("ModDate", text_string(&now));

    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Read title, author, subject and keywords back from a document.
pub fn read_info(doc: &Document) -> Metadata {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok()
    else {
        return Metadata::default();
    };

    let field = |key: &[u8]| info.get(key).and_then(decode_text_string).ok();

    Metadata::new(
        field(b"Title"),
        field(b"Author"),
        field(b"Subject"),
        field(b"Keywords"),
    )
}

/// PDF date string in UTC: `D:YYYYMMDDHHmmSSZ`.
fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lopdf::StringFormat;

    fn info_dictionary(doc: &Document) -> &Dictionary {
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        doc.get_dictionary(info_id).unwrap()
    }

    #[test]
    fn test_write_and_read_info() {
        let mut doc = Document::with_version("1.5");
        let metadata = Metadata::new(
            Some("Holiday".to_string()),
            Some("Filippo".to_string()),
            None,
            Some("photos, scans".to_string()),
        );

        write_info(&mut doc, &metadata);

        assert_eq!(read_info(&doc), metadata);
        let info = info_dictionary(&doc);
        assert!(info.get(b"Producer").is_ok());
        assert!(info.get(b"CreationDate").is_ok());
        assert!(info.get(b"Subject").is_err());
    }

    #[test]
    fn test_non_ascii_title_is_utf16() {
        let mut doc = Document::with_version("1.5");
        let metadata = Metadata::new(Some("Café – Été".to_string()), None, None, None);

        write_info(&mut doc, &metadata);

        let title = info_dictionary(&doc).get(b"Title").unwrap();
        let Object::String(bytes, StringFormat::Hexadecimal) = title else {
            panic!("expected a hex string, got {title:?}");
        };
        assert!(bytes.starts_with(&[0xFE, 0xFF]));
        assert_eq!(decode_text_string(title).unwrap(), "Café – Été");
        assert_eq!(read_info(&doc).title.as_deref(), Some("Café – Été"));
    }

    #[test]
    fn test_ascii_title_stays_literal() {
        let mut doc = Document::with_version("1.5");
        let metadata = Metadata::new(Some("Scans".to_string()), None, None, None);

        write_info(&mut doc, &metadata);

        let title = info_dictionary(&doc).get(b"Title").unwrap();
        assert_eq!(
            title,
            &Object::String(b"Scans".to_vec(), StringFormat::Literal)
        );
    }

    #[test]
    fn test_read_info_without_dictionary() {
        let doc = Document::with_version("1.5");
        assert!(read_info(&doc).is_empty());
    }

    #[test]
    fn test_format_pdf_date() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(format_pdf_date(epoch), "D:19700101000000Z");

        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 12, 34, 56).unwrap();
        assert_eq!(format_pdf_date(leap), "D:20240229123456Z");
    }
}
