use std::path::Path;

use canon_core::{sort_issues, Issue};
use canon_lock::{LockError, LockStore, TamperPolicy};
use canon_schema::validate_records;
use canon_store::load_all;

use crate::content_set::ContentSet;
use crate::integrity::check_integrity;

/// Why a load refused to produce a [`ContentSet`].
#[derive(Debug)]
pub enum LoadError {
    /// Could not read the content root at all.
    Storage(String),
    Lock(LockError),
    /// The content was readable but invalid. Carries every issue found, not
    /// just the first, so one run reports the full repair list.
    ValidationFailed { issues: Vec<Issue> },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Storage(msg) => write!(f, "storage error: {msg}"),
            LoadError::Lock(err) => write!(f, "lock store error: {err}"),
            LoadError::ValidationFailed { issues } => {
                let errors = issues.iter().filter(|i| i.is_error()).count();
                write!(f, "validation failed with {errors} error(s)")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LockError> for LoadError {
    fn from(err: LockError) -> LoadError {
        LoadError::Lock(err)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoadOptions {
    pub tamper_policy: TamperPolicy,
}

/// A successful load: the frozen set plus any non-fatal issues
/// (warnings and infos) the pipeline raised along the way.
#[derive(Debug)]
pub struct LoadedSet {
    pub set: ContentSet,
    pub warnings: Vec<Issue>,
}

/// Run the full pipeline over a content root: parse, schema-validate,
/// cross-reference, verify the tamper lock.
///
/// The gate is all-or-nothing: a single error-severity issue anywhere means
/// no set is produced. Rebuilding from the same tree yields the same result;
/// there is no cache to invalidate.
pub fn load_content_set(
    root: &Path,
    store: &dyn LockStore,
    options: LoadOptions,
) -> Result<LoadedSet, LoadError> {
    let loaded = load_all(root).map_err(LoadError::Storage)?;

    let mut issues = loaded.issues;
    issues.extend(validate_records(&loaded.records));
    issues.extend(check_integrity(&loaded.records));
    issues.extend(canon_lock::verify(
        &loaded.records,
        &loaded.raw,
        store,
        options.tamper_policy,
    )?);
    sort_issues(&mut issues);

    if issues.iter().any(|i| i.is_error()) {
        return Err(LoadError::ValidationFailed { issues });
    }
    Ok(LoadedSet {
        set: ContentSet::new(loaded.records),
        warnings: issues,
    })
}
