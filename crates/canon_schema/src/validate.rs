use canon_core::record::is_valid_identifier;
use canon_core::{sort_issues, Issue, IssueKind, Record, Tier};
use serde_json::Value;

use crate::table::{schema_for, Arity};

/// Check one record against its category schema. Per-record only: no other
/// record is consulted. Every problem is reported; nothing short-circuits.
pub fn validate_record(record: &Record) -> Vec<Issue> {
    let schema = schema_for(record.category);
    let mut issues = Vec::new();
    let path = record.path.as_str();

    // Universal: slug.
    match record.metadata.get("slug") {
        None => issues.push(
            Issue::error(IssueKind::MissingField, path, "required field is missing")
                .with_field("slug"),
        ),
        Some(Value::String(slug)) => {
            if !is_valid_identifier(slug) {
                issues.push(
                    Issue::error(
                        IssueKind::InvalidIdentifier,
                        path,
                        format!(
                            "`{}` must be non-empty lowercase alphanumerics and hyphens",
                            slug
                        ),
                    )
                    .with_field("slug"),
                );
            }
            let stem = file_stem(path);
            if slug != stem {
                issues.push(
                    Issue::error(
                        IssueKind::MisfiledRecord,
                        path,
                        format!("slug `{}` does not match file name `{}`", slug, stem),
                    )
                    .with_field("slug"),
                );
            }
        }
        Some(other) => issues.push(type_mismatch(path, "slug", "string", other)),
    }

    // Universal: tier.
    match record.metadata.get("tier") {
        None => issues.push(
            Issue::error(IssueKind::MissingField, path, "required field is missing")
                .with_field("tier"),
        ),
        Some(value) => match value.as_i64() {
            Some(n) if Tier::from_value(n).is_some() => {}
            Some(n) => issues.push(
                Issue::error(
                    IssueKind::InvalidEnum,
                    path,
                    format!("tier {} is not one of 1, 2, 3", n),
                )
                .with_field("tier"),
            ),
            None => issues.push(type_mismatch(path, "tier", "integer", value)),
        },
    }

    // Universal: status, optional enum.
    if let Some(value) = record.metadata.get("status") {
        match value.as_str() {
            Some(s) if canon_core::Status::from_str_name(s).is_some() => {}
            Some(s) => issues.push(
                Issue::error(
                    IssueKind::InvalidEnum,
                    path,
                    format!("status `{}` is not one of canon, draft, apocrypha", s),
                )
                .with_field("status"),
            ),
            None => issues.push(type_mismatch(path, "status", "string", value)),
        }
    }

    // Location agreement: directory must match the declared category.
    if !glob_match::glob_match(schema.location_pattern, path) {
        issues.push(Issue::error(
            IssueKind::MisfiledRecord,
            path,
            format!(
                "{} record stored outside `{}`",
                record.category, schema.location_pattern
            ),
        ));
    }
    if let Some(declared) = record.metadata.get("category").and_then(|v| v.as_str()) {
        if declared != record.category.as_str() {
            issues.push(
                Issue::error(
                    IssueKind::MisfiledRecord,
                    path,
                    format!(
                        "declares category `{}` but is stored as {}",
                        declared, record.category
                    ),
                )
                .with_field("category"),
            );
        }
    }

    // Category-specific required scalars.
    for field in schema.required {
        match record.metadata.get(*field) {
            None => issues.push(
                Issue::error(IssueKind::MissingField, path, "required field is missing")
                    .with_field(*field),
            ),
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(Value::String(_)) => issues.push(
                Issue::error(IssueKind::MissingField, path, "required field is empty")
                    .with_field(*field),
            ),
            Some(other) => issues.push(type_mismatch(path, field, "string", other)),
        }
    }

    // Reference fields: shape only here; resolution is the integrity pass.
    for reference in schema.references {
        let value = record.metadata.get(reference.field);
        match (reference.arity, value) {
            (_, None) => {
                if reference.required {
                    issues.push(
                        Issue::error(IssueKind::MissingField, path, "required field is missing")
                            .with_field(reference.field),
                    );
                }
            }
            (Arity::Single, Some(Value::String(_))) => {}
            (Arity::Single, Some(other)) => {
                issues.push(type_mismatch(path, reference.field, "string", other))
            }
            (Arity::Array, Some(Value::Array(items))) => {
                for item in items {
                    if !item.is_string() {
                        issues.push(type_mismatch(path, reference.field, "array of strings", item));
                    }
                }
            }
            (Arity::Array, Some(other)) => {
                issues.push(type_mismatch(path, reference.field, "array", other))
            }
        }
    }

    issues
}

/// Validate a whole batch, returning issues sorted for deterministic output.
pub fn validate_records(records: &[Record]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for record in records {
        issues.extend(validate_record(record));
    }
    sort_issues(&mut issues);
    issues
}

fn type_mismatch(path: &str, field: &str, expected: &str, got: &Value) -> Issue {
    Issue::error(
        IssueKind::InvalidFieldType,
        path,
        format!("expected {}, got {}", expected, value_type_name(got)),
    )
    .with_field(field)
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
