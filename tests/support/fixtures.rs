//! Document and catalog fixtures for integration tests.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, Stream};

/// Catalog endpoint path used by mock servers.
pub const CATALOG_PATH: &str = "/ap-doc-search/v1/sds-document";

/// Serializes a minimal PDF with `pages` empty pages.
#[must_use]
pub fn pdf_bytes(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set(
        "Count",
        Object::Integer(i64::try_from(kids.len()).expect("page count fits i64")),
    );
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF fixture");
    bytes
}

/// Builds a catalog response body listing `links`, plus one entry without a link.
#[must_use]
pub fn catalog_body(links: &[String]) -> serde_json::Value {
    let mut items: Vec<serde_json::Value> = links
        .iter()
        .map(|link| serde_json::json!({ "link": link, "title": "Safety data sheet" }))
        .collect();
    items.push(serde_json::json!({ "id": 1, "title": "No document attached" }));
    serde_json::json!({ "items": items, "total": items.len() })
}

/// Lists files under `dir` as sorted `/`-separated relative paths.
#[must_use]
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .map(PathBuf::from)
                .unwrap_or_default()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    names.sort();
    names
}
