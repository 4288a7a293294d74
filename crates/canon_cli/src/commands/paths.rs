use std::path::PathBuf;

use canon_core::Category;
use canon_graph::{load_content_set, LoadError, LoadOptions};
use clap::Parser;

use super::{lock_store, resolve_root, tamper_policy};

#[derive(Parser, Debug, Clone)]
pub struct PathsArgs {
    /// Content root (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,
    /// Lock table path (default: <root>/canon.lock)
    #[arg(long, value_name = "PATH")]
    pub lockfile: Option<PathBuf>,
    /// Restrict to one category (e.g. character, district)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,
    /// Downgrade tier-1 hash mismatches to warnings
    #[arg(long)]
    pub allow_tamper: bool,
    /// Output JSON instead of plain lines
    #[arg(long)]
    pub json: bool,
}

/// Enumerate routable pages. Runs the whole pipeline first: an invalid tree
/// has no routable pages.
pub fn run_paths(args: PathsArgs) -> Result<(), String> {
    let category = match args.category.as_deref() {
        Some(name) => Some(
            Category::from_str_name(name)
                .ok_or_else(|| format!("unknown category `{name}`"))?,
        ),
        None => None,
    };

    let root = resolve_root(args.root);
    let store = lock_store(&root, args.lockfile);
    let options = LoadOptions {
        tamper_policy: tamper_policy(args.allow_tamper),
    };

    let loaded = match load_content_set(&root, &store, options) {
        Ok(loaded) => loaded,
        Err(LoadError::ValidationFailed { issues }) => {
            for issue in issues.iter().filter(|i| i.is_error()) {
                eprintln!("{issue}");
            }
            let errors = issues.iter().filter(|i| i.is_error()).count();
            return Err(format!(
                "paths unavailable: content has {errors} validation error(s)"
            ));
        }
        Err(err) => return Err(format!("paths {}: {}", root.display(), err)),
    };

    let paths = match category {
        Some(category) => loaded.set.static_paths_for(category),
        None => loaded.set.static_paths(),
    };

    if args.json {
        let text =
            serde_json::to_string_pretty(&paths).map_err(|e| format!("json encode: {e}"))?;
        println!("{text}");
    } else {
        for path in &paths {
            println!("{}/{}", path.category.dir_name(), path.identifier);
        }
        println!("paths status=ok count={}", paths.len());
    }
    Ok(())
}
