use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use canon_core::{Category, Issue, IssueKind, Record};

use crate::frontmatter::split_document;

/// Result of loading one category directory.
#[derive(Debug, Default)]
pub struct CategoryLoad {
    pub records: Vec<Record>,
    /// Per-file parse failures. The caller decides whether any is fatal.
    pub issues: Vec<Issue>,
    /// Raw file bytes keyed by root-relative path, for content hashing.
    pub raw: BTreeMap<String, Vec<u8>>,
}

/// Everything loaded from a content root, across all categories.
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub records: Vec<Record>,
    pub issues: Vec<Issue>,
    pub raw: BTreeMap<String, Vec<u8>>,
}

/// Load every `*.md` file under the category's directory.
///
/// A missing directory yields zero records, not an error (unused categories
/// are legal). Files are visited in sorted order; dotfiles are skipped.
/// A file that fails to parse becomes a `MalformedRecord` issue and does not
/// abort its siblings.
pub fn load_category(root: &Path, category: Category) -> Result<CategoryLoad, String> {
    let dir = root.join(category.dir_name());
    let mut out = CategoryLoad::default();
    if !dir.is_dir() {
        return Ok(out);
    }

    let mut paths: Vec<_> = Vec::new();
    let entries =
        fs::read_dir(&dir).map_err(|err| format!("read dir {}: {}", dir.display(), err))?;
    for entry in entries {
        let entry = entry.map_err(|err| format!("read dir {}: {}", dir.display(), err))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || path.is_dir() {
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let rel = format!(
            "{}/{}",
            category.dir_name(),
            path.file_name().and_then(|s| s.to_str()).unwrap_or_default()
        );
        let bytes = fs::read(&path).map_err(|err| format!("read {}: {}", rel, err))?;
        let content = String::from_utf8_lossy(&bytes).to_string();
        match split_document(&content) {
            Ok((metadata, body)) => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                // Fall back to the file stem so a record with a broken slug
                // field still participates in the rest of validation.
                let identifier = metadata
                    .get("slug")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or(stem);
                out.records.push(Record {
                    category,
                    identifier,
                    metadata,
                    body,
                    path: rel.clone(),
                });
                out.raw.insert(rel, bytes);
            }
            Err(err) => {
                out.issues
                    .push(Issue::error(IssueKind::MalformedRecord, rel, err.to_string()));
            }
        }
    }
    Ok(out)
}

/// Load all categories under the content root.
pub fn load_all(root: &Path) -> Result<LoadedContent, String> {
    let mut out = LoadedContent::default();
    for category in Category::ALL {
        let load = load_category(root, category)?;
        out.records.extend(load.records);
        out.issues.extend(load.issues);
        out.raw.extend(load.raw);
    }
    Ok(out)
}
