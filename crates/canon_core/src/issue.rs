use serde::{Deserialize, Serialize};

/// Severity of a validation issue. Only `Error` fails a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// The fixed taxonomy of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedRecord,
    MissingField,
    InvalidFieldType,
    InvalidIdentifier,
    InvalidEnum,
    MisfiledRecord,
    DuplicateIdentifier,
    MissingReference,
    TypeMismatch,
    TamperDetected,
    TamperWarning,
    MissingLockfile,
    UnlockedRecord,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::MalformedRecord => "malformed_record",
            IssueKind::MissingField => "missing_field",
            IssueKind::InvalidFieldType => "invalid_field_type",
            IssueKind::InvalidIdentifier => "invalid_identifier",
            IssueKind::InvalidEnum => "invalid_enum",
            IssueKind::MisfiledRecord => "misfiled_record",
            IssueKind::DuplicateIdentifier => "duplicate_identifier",
            IssueKind::MissingReference => "missing_reference",
            IssueKind::TypeMismatch => "type_mismatch",
            IssueKind::TamperDetected => "tamper_detected",
            IssueKind::TamperWarning => "tamper_warning",
            IssueKind::MissingLockfile => "missing_lockfile",
            IssueKind::UnlockedRecord => "unlocked_record",
        }
    }
}

/// One validation finding, tied to a source file for diagnostics.
///
/// Issues are data, not errors: validators collect every problem in a batch
/// and the caller decides whether the batch as a whole is fatal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Content-root-relative path of the offending file.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn error(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Issue {
        Issue {
            kind,
            severity: Severity::Error,
            path: path.into(),
            field: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Issue {
        Issue {
            severity: Severity::Warning,
            ..Issue::error(kind, path, message)
        }
    }

    pub fn info(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Issue {
        Issue {
            severity: Severity::Info,
            ..Issue::error(kind, path, message)
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Issue {
        self.field = Some(field.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{} [{}] {} `{}`: {}",
                self.severity.as_str(),
                self.kind.as_str(),
                self.path,
                field,
                self.message
            ),
            None => write!(
                f,
                "{} [{}] {}: {}",
                self.severity.as_str(),
                self.kind.as_str(),
                self.path,
                self.message
            ),
        }
    }
}

/// Sort issues by (path, field, message) so reports are deterministic.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.field.cmp(&b.field))
            .then_with(|| a.message.cmp(&b.message))
    });
}
