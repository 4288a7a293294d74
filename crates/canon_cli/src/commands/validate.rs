use std::path::PathBuf;

use canon_core::{Issue, Severity};
use canon_graph::{load_content_set, LoadError, LoadOptions};
use clap::Parser;

use super::{lock_store, resolve_root, tamper_policy};

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Content root (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,
    /// Lock table path (default: <root>/canon.lock)
    #[arg(long, value_name = "PATH")]
    pub lockfile: Option<PathBuf>,
    /// Downgrade tier-1 hash mismatches to warnings
    #[arg(long)]
    pub allow_tamper: bool,
    /// Output JSON instead of plain lines
    #[arg(long)]
    pub json: bool,
}

pub fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let root = resolve_root(args.root);
    let store = lock_store(&root, args.lockfile);
    let options = LoadOptions {
        tamper_policy: tamper_policy(args.allow_tamper),
    };

    let (record_count, issues, passed) = match load_content_set(&root, &store, options) {
        Ok(loaded) => (Some(loaded.set.len()), loaded.warnings, true),
        Err(LoadError::ValidationFailed { issues }) => (None, issues, false),
        Err(err) => return Err(format!("validate {}: {}", root.display(), err)),
    };

    report(record_count, &issues, passed, args.json)?;
    if passed {
        Ok(())
    } else {
        let errors = issues.iter().filter(|i| i.is_error()).count();
        Err(format!("validation failed with {errors} error(s)"))
    }
}

fn report(
    record_count: Option<usize>,
    issues: &[Issue],
    passed: bool,
    json: bool,
) -> Result<(), String> {
    if json {
        let payload = serde_json::json!({
            "status": if passed { "ok" } else { "failed" },
            "records": record_count,
            "errors": issues.iter().filter(|i| i.is_error()).count(),
            "issues": issues,
        });
        let text =
            serde_json::to_string_pretty(&payload).map_err(|e| format!("json encode: {e}"))?;
        println!("{text}");
    } else {
        for issue in issues {
            println!("{issue}");
        }
        let errors = issues.iter().filter(|i| i.is_error()).count();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();
        match record_count {
            Some(n) => println!(
                "validate status=ok records={n} errors={errors} warnings={warnings}"
            ),
            None => println!(
                "validate status=failed errors={errors} warnings={warnings}"
            ),
        }
    }
    Ok(())
}
