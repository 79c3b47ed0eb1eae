//! Page tree helpers.
//!
//! This module handles page-level work on `lopdf` documents:
//! - Resolving attributes a page inherits from its ancestors
//! - Reading page dimensions
//! - Building a fresh, flat page tree

use crate::error::{BuilderError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes that may be inherited from a parent `Pages` node.
pub const INHERITABLE_ATTRIBUTES: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// US Letter, the fallback when a page has no MediaBox anywhere in its tree.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Read a numeric PDF object as `f32`.
pub fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Follow a reference (if any) to the object it points at.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up `key` on a page, walking up the `Parent` chain if needed.
///
/// Returns a clone of the first value found. The walk is bounded so a
/// malformed, cyclic tree cannot loop forever.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

/// Width and height of a page in points, honouring `/Rotate`.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve(doc, &obj).cloned())
        .and_then(|obj| {
            let values: Vec<f32> = obj.as_array().ok()?.iter().filter_map(as_number).collect();
            (values.len() == 4).then(|| [values[0], values[1], values[2], values[3]])
        })
        .unwrap_or(DEFAULT_MEDIA_BOX);

    let width = (media_box[2] - media_box[0]).abs();
    let height = (media_box[3] - media_box[1]).abs();

    let rotate = inherited_attribute(doc, page_id, b"Rotate")
        .as_ref()
        .and_then(as_number)
        .map(|r| r as i64)
        .unwrap_or(0);

    if rotate.rem_euclid(180) == 90 {
        (height, width)
    } else {
        (width, height)
    }
}

/// Copy inherited attributes onto the page itself.
///
/// Required before a page is moved under a different `Pages` node, or it
/// would silently lose its size and fonts.
pub fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut missing = Vec::new();
    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| BuilderError::export_failed(format!("Failed to get page: {e}")))?;
        for key in INHERITABLE_ATTRIBUTES {
            if page.get(key).is_err() {
                missing.push(*key);
            }
        }
    }

    let mut found = Vec::new();
    for key in missing {
        if let Some(value) = inherited_attribute(doc, page_id, key) {
            found.push((key.to_vec(), value));
        }
    }

    if found.is_empty() {
        return Ok(());
    }

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| BuilderError::export_failed(format!("Failed to get page: {e}")))?;
    for (key, value) in found {
        page.set(key, value);
    }

    Ok(())
}

/// Create a `Pages` node holding `page_ids` in order and re-parent the pages.
///
/// Returns the id of the new node.
pub fn build_page_tree(doc: &mut Document, page_ids: &[ObjectId]) -> Result<ObjectId> {
    let pages_id = doc.new_object_id();

    for &page_id in page_ids {
        let page = doc.get_dictionary_mut(page_id).map_err(|e| {
            BuilderError::export_failed(format!("Page {page_id:?} is not a dictionary: {e}"))
        })?;
        page.set("Parent", Object::Reference(pages_id));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set(
        "Kids",
        Object::Array(page_ids.iter().map(|&id| Object::Reference(id)).collect()),
    );
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    Ok(pages_id)
}
