use std::path::PathBuf;

use canon_core::sort_issues;
use canon_graph::check_integrity;
use canon_lock::LockStore;
use canon_schema::validate_records;
use canon_store::load_all;
use clap::Parser;

use super::{lock_store, resolve_root};

#[derive(Parser, Debug, Clone)]
pub struct RelockArgs {
    /// Content root (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,
    /// Lock table path (default: <root>/canon.lock)
    #[arg(long, value_name = "PATH")]
    pub lockfile: Option<PathBuf>,
    /// Output JSON instead of plain lines
    #[arg(long)]
    pub json: bool,
}

/// Re-pin every tier-1 record's hash to its current content.
///
/// Tamper findings never block a relock (relocking is how drift is accepted),
/// but schema or cross-reference errors do: a lock table must only ever
/// describe content that would otherwise load.
pub fn run_relock(args: RelockArgs) -> Result<(), String> {
    let root = resolve_root(args.root);
    let store = lock_store(&root, args.lockfile);

    let loaded = load_all(&root).map_err(|err| format!("relock {}: {}", root.display(), err))?;
    let mut issues = loaded.issues;
    issues.extend(validate_records(&loaded.records));
    issues.extend(check_integrity(&loaded.records));
    sort_issues(&mut issues);

    if issues.iter().any(|i| i.is_error()) {
        for issue in issues.iter().filter(|i| i.is_error()) {
            eprintln!("{issue}");
        }
        let errors = issues.iter().filter(|i| i.is_error()).count();
        return Err(format!(
            "refusing to relock: content has {errors} validation error(s)"
        ));
    }

    let pinned = canon_lock::relock(&loaded.records, &loaded.raw, &store)
        .map_err(|err| format!("relock {}: {}", store.describe(), err))?;

    if args.json {
        let payload = serde_json::json!({
            "status": "ok",
            "lockfile": store.describe(),
            "pinned": pinned,
        });
        let text =
            serde_json::to_string_pretty(&payload).map_err(|e| format!("json encode: {e}"))?;
        println!("{text}");
    } else {
        println!("relock status=ok pinned={pinned} lockfile={}", store.describe());
    }
    Ok(())
}
