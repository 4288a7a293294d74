use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use canon_core::{sort_issues, Issue, IssueKind, Record};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const LOCK_TABLE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum LockError {
    Io(String),
    Toml(String),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Io(err) => write!(f, "lockfile io error: {}", err),
            LockError::Toml(err) => write!(f, "lockfile toml error: {}", err),
        }
    }
}

impl std::error::Error for LockError {}

/// The persisted identifier → content hash table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockTable {
    pub version: u32,
    pub generated_at: String,
    /// identifier → sha256 hex over the raw source file bytes.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

/// Persistence seam for the lock table. The validation logic only ever sees
/// this trait, so the backing store (local file, remote KV) is swappable.
pub trait LockStore {
    /// `Ok(None)` means no lock state has ever been established.
    fn read(&self) -> Result<Option<LockTable>, LockError>;
    fn write(&self, table: &LockTable) -> Result<(), LockError>;
    /// Where the table lives, for diagnostics.
    fn describe(&self) -> String;
}

/// TOML lockfile next to the content, the shipped `LockStore`.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(path: impl Into<PathBuf>) -> FileLockStore {
        FileLockStore { path: path.into() }
    }
}

impl LockStore for FileLockStore {
    fn read(&self) -> Result<Option<LockTable>, LockError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|err| LockError::Io(format!("read {}: {}", self.path.display(), err)))?;
        let table = toml::from_str(&text)
            .map_err(|err| LockError::Toml(format!("parse {}: {}", self.path.display(), err)))?;
        Ok(Some(table))
    }

    fn write(&self, table: &LockTable) -> Result<(), LockError> {
        let text = toml::to_string_pretty(table)
            .map_err(|err| LockError::Toml(format!("encode lock table: {}", err)))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| LockError::Io(format!("mkdir {}: {}", parent.display(), err)))?;
        }
        fs::write(&self.path, text)
            .map_err(|err| LockError::Io(format!("write {}: {}", self.path.display(), err)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// How to treat a recorded-hash mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TamperPolicy {
    /// Mismatch is an error and blocks the load.
    #[default]
    Strict,
    /// Mismatch is downgraded to a warning (explicit override).
    AllowDrift,
}

pub const TAMPER_OVERRIDE_ENV: &str = "CANON_ALLOW_TAMPER";

impl TamperPolicy {
    /// `CANON_ALLOW_TAMPER=1` (or `true`) downgrades tamper to warnings.
    pub fn from_env() -> TamperPolicy {
        TamperPolicy::from_env_value(std::env::var(TAMPER_OVERRIDE_ENV).ok().as_deref())
    }

    /// Policy for one observed variable value; `None` means unset.
    pub fn from_env_value(value: Option<&str>) -> TamperPolicy {
        match value {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => TamperPolicy::AllowDrift,
            _ => TamperPolicy::Strict,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Recompute hashes for every Tier-1 record and compare against the stored
/// table. Never writes anything.
///
/// An absent table yields a single warning (lock state was never
/// established) rather than an error, so bootstrap stays possible; a Tier-1
/// record missing from an existing table is an info-level note.
pub fn verify(
    records: &[Record],
    raw: &BTreeMap<String, Vec<u8>>,
    store: &dyn LockStore,
    policy: TamperPolicy,
) -> Result<Vec<Issue>, LockError> {
    let table = match store.read()? {
        Some(table) => table,
        None => {
            return Ok(vec![Issue::warning(
                IssueKind::MissingLockfile,
                store.describe(),
                "no lock table found; tier-1 records are unpinned (run `canon relock`)",
            )]);
        }
    };

    let mut issues = Vec::new();
    for record in locked_records(records) {
        let Some(bytes) = raw.get(&record.path) else {
            continue;
        };
        let current = sha256_hex(bytes);
        match table.entries.get(&record.identifier) {
            Some(recorded) if *recorded != current => {
                let message = format!(
                    "tier-1 record `{}` changed since it was locked (recorded {}, current {})",
                    record.identifier,
                    hash_prefix(recorded),
                    hash_prefix(&current)
                );
                issues.push(match policy {
                    TamperPolicy::Strict => {
                        Issue::error(IssueKind::TamperDetected, record.path.clone(), message)
                    }
                    TamperPolicy::AllowDrift => {
                        Issue::warning(IssueKind::TamperWarning, record.path.clone(), message)
                    }
                });
            }
            Some(_) => {}
            None => issues.push(Issue::info(
                IssueKind::UnlockedRecord,
                record.path.clone(),
                format!(
                    "tier-1 record `{}` has no recorded hash",
                    record.identifier
                ),
            )),
        }
    }
    sort_issues(&mut issues);
    Ok(issues)
}

/// Recompute and overwrite the whole table for all current Tier-1 records.
/// Only ever invoked explicitly; returns the number of pinned entries.
pub fn relock(
    records: &[Record],
    raw: &BTreeMap<String, Vec<u8>>,
    store: &dyn LockStore,
) -> Result<usize, LockError> {
    let mut entries = BTreeMap::new();
    for record in locked_records(records) {
        if let Some(bytes) = raw.get(&record.path) {
            entries.insert(record.identifier.clone(), sha256_hex(bytes));
        }
    }
    let count = entries.len();
    let table = LockTable {
        version: LOCK_TABLE_VERSION,
        generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entries,
    };
    store.write(&table)?;
    Ok(count)
}

/// First 12 characters of a recorded hash for diagnostics. Recorded values
/// come from the lockfile and may be arbitrary text, so truncation must not
/// assume ASCII.
fn hash_prefix(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn locked_records(records: &[Record]) -> impl Iterator<Item = &Record> {
    records
        .iter()
        .filter(|r| r.tier().map(|t| t.is_locked()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_core::Category;
    use serde_json::json;
    use tempfile::TempDir;

    fn tier1_record(slug: &str, category: Category) -> Record {
        let path = format!("{}/{}.md", category.dir_name(), slug);
        let metadata = [
            ("slug".to_string(), json!(slug)),
            ("name".to_string(), json!(slug)),
            ("tier".to_string(), json!(1)),
        ]
        .into_iter()
        .collect();
        Record {
            category,
            identifier: slug.to_string(),
            metadata,
            body: String::new(),
            path,
        }
    }

    fn fixture() -> (Vec<Record>, BTreeMap<String, Vec<u8>>) {
        let records = vec![
            tier1_record("the-static", Category::Belief),
            tier1_record("maya-chen", Category::Character),
        ];
        let raw = records
            .iter()
            .map(|r| (r.path.clone(), format!("source of {}", r.identifier).into_bytes()))
            .collect();
        (records, raw)
    }

    fn store(dir: &TempDir) -> FileLockStore {
        FileLockStore::new(dir.path().join("canon.lock"))
    }

    #[test]
    fn missing_lockfile_is_one_warning() {
        let dir = TempDir::new().expect("tempdir");
        let (records, raw) = fixture();
        let issues = verify(&records, &raw, &store(&dir), TamperPolicy::Strict).expect("verify");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingLockfile);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn relock_then_verify_is_clean() {
        let dir = TempDir::new().expect("tempdir");
        let (records, raw) = fixture();
        let store = store(&dir);
        let count = relock(&records, &raw, &store).expect("relock");
        assert_eq!(count, 2);
        let issues = verify(&records, &raw, &store, TamperPolicy::Strict).expect("verify");
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn single_byte_mutation_is_one_tamper_error() {
        let dir = TempDir::new().expect("tempdir");
        let (records, mut raw) = fixture();
        let store = store(&dir);
        relock(&records, &raw, &store).expect("relock");

        raw.get_mut("beliefs/the-static.md").unwrap()[0] ^= 1;
        let issues = verify(&records, &raw, &store, TamperPolicy::Strict).expect("verify");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TamperDetected);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("the-static"));
        assert_eq!(issues[0].path, "beliefs/the-static.md");
    }

    #[test]
    fn override_policy_downgrades_to_warning() {
        let dir = TempDir::new().expect("tempdir");
        let (records, mut raw) = fixture();
        let store = store(&dir);
        relock(&records, &raw, &store).expect("relock");

        raw.get_mut("characters/maya-chen.md").unwrap().push(b'x');
        let issues = verify(&records, &raw, &store, TamperPolicy::AllowDrift).expect("verify");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TamperWarning);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn unpinned_tier1_record_is_info() {
        let dir = TempDir::new().expect("tempdir");
        let (mut records, mut raw) = fixture();
        let store = store(&dir);
        relock(&records, &raw, &store).expect("relock");

        let newcomer = tier1_record("clean-signal", Category::Belief);
        raw.insert(newcomer.path.clone(), b"new source".to_vec());
        records.push(newcomer);
        let issues = verify(&records, &raw, &store, TamperPolicy::Strict).expect("verify");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnlockedRecord);
        assert_eq!(issues[0].severity, canon_core::Severity::Info);
    }

    #[test]
    fn non_tier1_records_are_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let mut record = tier1_record("minor-note", Category::Thread);
        record.metadata.insert("tier".into(), json!(3));
        let raw: BTreeMap<String, Vec<u8>> =
            [(record.path.clone(), b"text".to_vec())].into_iter().collect();
        let store = store(&dir);
        let count = relock(&[record.clone()], &raw, &store).expect("relock");
        assert_eq!(count, 0);
        let issues = verify(&[record], &raw, &store, TamperPolicy::Strict).expect("verify");
        assert!(issues.is_empty());
    }

    #[test]
    fn env_override_switches_policy() {
        assert_eq!(TamperPolicy::from_env_value(None), TamperPolicy::Strict);
        assert_eq!(
            TamperPolicy::from_env_value(Some("1")),
            TamperPolicy::AllowDrift
        );
        assert_eq!(
            TamperPolicy::from_env_value(Some("true")),
            TamperPolicy::AllowDrift
        );
        assert_eq!(
            TamperPolicy::from_env_value(Some("TRUE")),
            TamperPolicy::AllowDrift
        );
        assert_eq!(TamperPolicy::from_env_value(Some("0")), TamperPolicy::Strict);
        assert_eq!(
            TamperPolicy::from_env_value(Some("yes")),
            TamperPolicy::Strict
        );
    }

    #[test]
    fn corrupted_lockfile_entry_still_reports_mismatch() {
        let dir = TempDir::new().expect("tempdir");
        let (records, raw) = fixture();
        let store = store(&dir);
        // hand-edited entry: not hex, and byte 12 lands inside a
        // multibyte character
        let table = LockTable {
            version: LOCK_TABLE_VERSION,
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            entries: [
                ("the-static".to_string(), "aaaaaaaaaaa\u{00e9}zzzz".to_string()),
                (
                    "maya-chen".to_string(),
                    sha256_hex(&raw["characters/maya-chen.md"]),
                ),
            ]
            .into_iter()
            .collect(),
        };
        store.write(&table).expect("write");
        let issues = verify(&records, &raw, &store, TamperPolicy::Strict).expect("verify");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TamperDetected);
        assert_eq!(issues[0].path, "beliefs/the-static.md");
        assert!(issues[0].message.contains("the-static"));
    }

    #[test]
    fn lock_table_round_trips_through_toml() {
        let dir = TempDir::new().expect("tempdir");
        let (records, raw) = fixture();
        let store = store(&dir);
        relock(&records, &raw, &store).expect("relock");
        let table = store.read().expect("read").expect("present");
        assert_eq!(table.version, LOCK_TABLE_VERSION);
        assert_eq!(table.entries.len(), 2);
        assert!(table.entries.contains_key("maya-chen"));
        let hash = &table.entries["maya-chen"];
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
