use canon_core::Category;

/// Whether a reference field holds one identifier or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Array,
}

/// A frontmatter field holding identifiers that must resolve to records of
/// one specific category.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceField {
    pub field: &'static str,
    pub expected: Category,
    pub arity: Arity,
    /// Required fields must be present (arrays may still be empty).
    pub required: bool,
}

/// The expected shape of one category's records.
///
/// The table is fixed in code: the category set is closed, so there is
/// nothing for a registry file to vary.
#[derive(Debug, Clone, Copy)]
pub struct CategorySchema {
    pub category: Category,
    /// Root-relative location pattern the record's path must match.
    pub location_pattern: &'static str,
    /// Required scalar string fields beyond the universal slug/tier.
    pub required: &'static [&'static str],
    pub references: &'static [ReferenceField],
}

const fn single(field: &'static str, expected: Category) -> ReferenceField {
    ReferenceField {
        field,
        expected,
        arity: Arity::Single,
        required: true,
    }
}

const fn array(field: &'static str, expected: Category) -> ReferenceField {
    ReferenceField {
        field,
        expected,
        arity: Arity::Array,
        required: true,
    }
}

const fn optional_array(field: &'static str, expected: Category) -> ReferenceField {
    ReferenceField {
        field,
        expected,
        arity: Arity::Array,
        required: false,
    }
}

pub const SCHEMAS: &[CategorySchema] = &[
    CategorySchema {
        category: Category::District,
        location_pattern: "districts/*.md",
        required: &["name", "description"],
        references: &[optional_array("rivalDistricts", Category::District)],
    },
    CategorySchema {
        category: Category::Character,
        location_pattern: "characters/*.md",
        required: &["name", "role", "reputation", "privateTruth"],
        references: &[
            single("district", Category::District),
            array("beliefs", Category::Belief),
            array("factions", Category::Faction),
        ],
    },
    CategorySchema {
        category: Category::Story,
        location_pattern: "stories/*.md",
        required: &["title", "summary"],
        references: &[
            array("characters", Category::Character),
            array("districts", Category::District),
            array("beliefs", Category::Belief),
            array("factions", Category::Faction),
            array("threads", Category::Thread),
            array("conflicts", Category::Conflict),
        ],
    },
    CategorySchema {
        category: Category::Belief,
        location_pattern: "beliefs/*.md",
        required: &["name", "description"],
        references: &[optional_array("opposes", Category::Belief)],
    },
    CategorySchema {
        category: Category::Conflict,
        location_pattern: "conflicts/*.md",
        required: &["name", "description"],
        references: &[
            optional_array("parties", Category::Faction),
            optional_array("districts", Category::District),
        ],
    },
    CategorySchema {
        category: Category::Thread,
        location_pattern: "threads/*.md",
        required: &["name", "description"],
        references: &[optional_array("characters", Category::Character)],
    },
    CategorySchema {
        category: Category::Faction,
        location_pattern: "factions/*.md",
        required: &["name", "description"],
        references: &[optional_array("districts", Category::District)],
    },
    CategorySchema {
        category: Category::System,
        location_pattern: "systems/*.md",
        required: &["name", "description"],
        references: &[optional_array("districts", Category::District)],
    },
];

pub fn schema_for(category: Category) -> &'static CategorySchema {
    SCHEMAS
        .iter()
        .find(|s| s.category == category)
        .expect("every category has a schema entry")
}
