use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed set of content categories.
///
/// Every record belongs to exactly one category, and every category owns one
/// storage directory under the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    District,
    Character,
    Story,
    Belief,
    Conflict,
    Thread,
    Faction,
    System,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::District,
        Category::Character,
        Category::Story,
        Category::Belief,
        Category::Conflict,
        Category::Thread,
        Category::Faction,
        Category::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::District => "district",
            Category::Character => "character",
            Category::Story => "story",
            Category::Belief => "belief",
            Category::Conflict => "conflict",
            Category::Thread => "thread",
            Category::Faction => "faction",
            Category::System => "system",
        }
    }

    /// Storage directory under the content root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::District => "districts",
            Category::Character => "characters",
            Category::Story => "stories",
            Category::Belief => "beliefs",
            Category::Conflict => "conflicts",
            Category::Thread => "threads",
            Category::Faction => "factions",
            Category::System => "systems",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canon tier: ordinal importance level. Tier 1 is lock-protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub fn from_value(v: i64) -> Option<Tier> {
        match v {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            _ => None,
        }
    }

    pub fn as_value(self) -> i64 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }

    /// Whether records at this tier are pinned by the tamper lock.
    pub fn is_locked(self) -> bool {
        matches!(self, Tier::One)
    }
}

/// Optional editorial status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Canon,
    Draft,
    Apocrypha,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Canon, Status::Draft, Status::Apocrypha];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Canon => "canon",
            Status::Draft => "draft",
            Status::Apocrypha => "apocrypha",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// One content record: frontmatter metadata plus an opaque markdown body.
///
/// The metadata map is kept raw (as parsed); typed accessors below are
/// conveniences and return `None` when the field is absent or wrongly typed.
/// Shape enforcement is the schema validator's job, not this struct's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub category: Category,
    /// The slug. Globally unique across all categories once validated.
    pub identifier: String,
    pub metadata: BTreeMap<String, Value>,
    pub body: String,
    /// Content-root-relative source path, retained for diagnostics only.
    pub path: String,
}

impl Record {
    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn integer_field(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(|v| v.as_i64())
    }

    /// String items of an array field. Returns `None` if the field is absent
    /// or not an array; non-string items are skipped.
    pub fn string_list_field(&self, key: &str) -> Option<Vec<&str>> {
        let arr = self.metadata.get(key)?.as_array()?;
        Some(arr.iter().filter_map(|v| v.as_str()).collect())
    }

    pub fn tier(&self) -> Option<Tier> {
        self.integer_field("tier").and_then(Tier::from_value)
    }

    pub fn status(&self) -> Option<Status> {
        self.string_field("status").and_then(Status::from_str_name)
    }

    /// Display name: `name` for most categories, `title` for stories.
    pub fn display_name(&self) -> &str {
        self.string_field("name")
            .or_else(|| self.string_field("title"))
            .unwrap_or(&self.identifier)
    }
}

/// Slug charset rule: non-empty, lowercase ASCII alphanumerics and hyphens.
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
