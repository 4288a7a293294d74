use std::collections::BTreeMap;

use canon_core::{Category, Record};
use canon_schema::{schema_for, Arity};
use serde::Serialize;

/// The frozen, fully validated record set.
///
/// Built exactly once per load and never mutated, so concurrent readers can
/// share it freely. Relationship queries are linear scans over forward
/// references: there is no reverse index to drift out of sync with the
/// records themselves.
#[derive(Debug, Clone, Serialize)]
pub struct ContentSet {
    records: Vec<Record>,
    #[serde(skip)]
    by_identifier: BTreeMap<String, usize>,
}

/// One routable page: a validated (category, identifier) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPath {
    pub category: Category,
    pub identifier: String,
}

impl ContentSet {
    /// Freeze a validated record set. Callers must have run the schema and
    /// integrity passes first; identifiers are assumed unique here.
    pub fn new(mut records: Vec<Record>) -> ContentSet {
        records.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        let by_identifier = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.identifier.clone(), idx))
            .collect();
        ContentSet {
            records,
            by_identifier,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Typed lookup. Returns `None` when the identifier is unknown *or*
    /// belongs to a different category; callers narrow by expected type.
    pub fn get(&self, category: Category, identifier: &str) -> Option<&Record> {
        let record = self.get_any(identifier)?;
        (record.category == category).then_some(record)
    }

    /// Untyped lookup across all categories.
    pub fn get_any(&self, identifier: &str) -> Option<&Record> {
        self.by_identifier
            .get(identifier)
            .map(|idx| &self.records[*idx])
    }

    /// All records of one category, identifier-sorted.
    pub fn all(&self, category: Category) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Records of `result_category` whose reference fields point at
    /// `(target_category, target_identifier)`.
    ///
    /// Example: `related(Story, Character, "maya-chen")` is every story
    /// listing maya-chen in its `characters` field. Computed by scanning the
    /// result category's forward references; results are identifier-sorted.
    pub fn related(
        &self,
        result_category: Category,
        target_category: Category,
        target_identifier: &str,
    ) -> Vec<&Record> {
        let schema = schema_for(result_category);
        let fields: Vec<_> = schema
            .references
            .iter()
            .filter(|r| r.expected == target_category)
            .collect();
        if fields.is_empty() {
            return Vec::new();
        }
        self.all(result_category)
            .into_iter()
            .filter(|record| {
                fields.iter().any(|reference| match reference.arity {
                    Arity::Single => {
                        record.string_field(reference.field) == Some(target_identifier)
                    }
                    Arity::Array => record
                        .string_list_field(reference.field)
                        .map(|items| items.contains(&target_identifier))
                        .unwrap_or(false),
                })
            })
            .collect()
    }

    /// Every (category, identifier) pair, for build-time route generation.
    pub fn static_paths(&self) -> Vec<StaticPath> {
        self.records
            .iter()
            .map(|r| StaticPath {
                category: r.category,
                identifier: r.identifier.clone(),
            })
            .collect()
    }

    pub fn static_paths_for(&self, category: Category) -> Vec<StaticPath> {
        self.static_paths()
            .into_iter()
            .filter(|p| p.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(category: Category, slug: &str, extra: Value) -> Record {
        let mut metadata: std::collections::BTreeMap<String, Value> = [
            ("slug".to_string(), json!(slug)),
            ("name".to_string(), json!(slug)),
            ("tier".to_string(), json!(2)),
        ]
        .into_iter()
        .collect();
        if let Value::Object(map) = extra {
            metadata.extend(map);
        }
        Record {
            category,
            identifier: slug.to_string(),
            metadata,
            body: String::new(),
            path: format!("{}/{}.md", category.dir_name(), slug),
        }
    }

    fn world() -> ContentSet {
        ContentSet::new(vec![
            record(Category::District, "neon-docks", json!({})),
            record(Category::District, "glass-hill", json!({})),
            record(Category::Belief, "the-static", json!({})),
            record(
                Category::Character,
                "maya-chen",
                json!({ "district": "neon-docks", "beliefs": ["the-static"], "factions": [] }),
            ),
            record(
                Category::Character,
                "adrian-voss",
                json!({ "district": "glass-hill", "beliefs": [], "factions": [] }),
            ),
            record(
                Category::Story,
                "the-blackout",
                json!({
                    "title": "The Blackout",
                    "characters": ["maya-chen"],
                    "districts": ["neon-docks"],
                    "beliefs": [], "factions": [], "threads": [], "conflicts": []
                }),
            ),
        ])
    }

    #[test]
    fn typed_get_narrows_by_category() {
        let set = world();
        assert!(set.get(Category::Character, "maya-chen").is_some());
        // exists, but wrong category: None, not an error
        assert!(set.get(Category::Story, "maya-chen").is_none());
        assert!(set.get(Category::Character, "nobody").is_none());
    }

    #[test]
    fn all_is_identifier_sorted() {
        let set = world();
        let names: Vec<_> = set
            .all(Category::Character)
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["adrian-voss", "maya-chen"]);
    }

    #[test]
    fn characters_in_district() {
        let set = world();
        let locals = set.related(Category::Character, Category::District, "neon-docks");
        let names: Vec<_> = locals.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(names, vec!["maya-chen"]);
    }

    #[test]
    fn related_mirrors_forward_reference_exactly() {
        let set = world();
        let stories = set.related(Category::Story, Category::Character, "maya-chen");
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].identifier, "the-blackout");
        // adrian-voss appears in no story's characters field
        assert!(set
            .related(Category::Story, Category::Character, "adrian-voss")
            .is_empty());
    }

    #[test]
    fn related_with_no_linking_field_is_empty() {
        let set = world();
        // districts carry no reference field expecting characters
        assert!(set
            .related(Category::District, Category::Character, "maya-chen")
            .is_empty());
    }

    #[test]
    fn static_paths_cover_every_record() {
        let set = world();
        let paths = set.static_paths();
        assert_eq!(paths.len(), set.len());
        assert!(paths.contains(&StaticPath {
            category: Category::Story,
            identifier: "the-blackout".to_string()
        }));
        let districts = set.static_paths_for(Category::District);
        assert_eq!(districts.len(), 2);
        assert!(districts.iter().all(|p| p.category == Category::District));
    }

    #[test]
    fn queries_are_stable_across_rebuilds() {
        let a = world();
        let b = world();
        assert_eq!(a.static_paths(), b.static_paths());
        let rel_a: Vec<_> = a
            .related(Category::Character, Category::District, "neon-docks")
            .iter()
            .map(|r| r.identifier.clone())
            .collect();
        let rel_b: Vec<_> = b
            .related(Category::Character, Category::District, "neon-docks")
            .iter()
            .map(|r| r.identifier.clone())
            .collect();
        assert_eq!(rel_a, rel_b);
    }
}
