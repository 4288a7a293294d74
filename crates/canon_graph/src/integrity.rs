use std::collections::BTreeMap;

use canon_core::{sort_issues, Issue, IssueKind, Record};
use canon_schema::{schema_for, Arity};

/// Cross-record validation over the full loaded set.
///
/// Pass 1 builds the global identifier index and reports duplicates; pass 2
/// resolves every reference field against that index. Both passes always run
/// to completion so a batch reports every problem at once.
pub fn check_integrity(records: &[Record]) -> Vec<Issue> {
    let mut issues = Vec::new();

    // Pass 1: global identifier uniqueness (across all categories).
    let mut index: BTreeMap<&str, &Record> = BTreeMap::new();
    for record in records {
        match index.get(record.identifier.as_str()) {
            Some(first) => issues.push(Issue::error(
                IssueKind::DuplicateIdentifier,
                record.path.clone(),
                format!(
                    "identifier `{}` already declared by {}",
                    record.identifier, first.path
                ),
            )),
            None => {
                index.insert(record.identifier.as_str(), record);
            }
        }
    }

    // Pass 2: every declared reference resolves to the expected category.
    for record in records {
        let schema = schema_for(record.category);
        for reference in schema.references {
            let targets: Vec<&str> = match reference.arity {
                Arity::Single => record.string_field(reference.field).into_iter().collect(),
                Arity::Array => record
                    .string_list_field(reference.field)
                    .unwrap_or_default(),
            };
            for target in targets {
                match index.get(target) {
                    None => issues.push(
                        Issue::error(
                            IssueKind::MissingReference,
                            record.path.clone(),
                            format!("`{}` does not exist in any category", target),
                        )
                        .with_field(reference.field),
                    ),
                    Some(found) if found.category != reference.expected => issues.push(
                        Issue::error(
                            IssueKind::TypeMismatch,
                            record.path.clone(),
                            format!(
                                "`{}` must reference a {}, but it is a {} ({})",
                                target, reference.expected, found.category, found.path
                            ),
                        )
                        .with_field(reference.field),
                    ),
                    Some(_) => {}
                }
            }
        }
    }

    sort_issues(&mut issues);
    issues
}
