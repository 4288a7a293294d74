use std::collections::BTreeMap;

use serde_json::Value;

/// Why a content file could not be split into metadata and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No leading `---` frontmatter block.
    MissingFrontmatter,
    /// The block is present but is not valid YAML.
    Yaml(String),
    /// The block parsed but is not a flat key/value mapping.
    NotAMapping,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingFrontmatter => write!(f, "missing frontmatter block"),
            ParseError::Yaml(err) => write!(f, "invalid frontmatter yaml: {}", err),
            ParseError::NotAMapping => write!(f, "frontmatter is not a key/value mapping"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Split a content file into its frontmatter map and markdown body.
///
/// The file must start with a `---` line (optional BOM); the block ends at
/// the next `---` or `...` line. YAML is parsed via serde_yaml and converted
/// to `serde_json::Value` for uniform downstream handling. Pure function.
pub fn split_document(input: &str) -> Result<(BTreeMap<String, Value>, String), ParseError> {
    let mut lines = input.lines();

    let first = match lines.next() {
        Some(line) => line.trim_start_matches('\u{feff}').trim_end(),
        None => return Err(ParseError::MissingFrontmatter),
    };
    if first != "---" {
        return Err(ParseError::MissingFrontmatter);
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    let mut consumed = 1usize;
    for line in lines {
        consumed += 1;
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }
    if !closed {
        return Err(ParseError::MissingFrontmatter);
    }

    let metadata = parse_yaml_map(&yaml_lines.join("\n"))?;
    let body = input
        .lines()
        .skip(consumed)
        .collect::<Vec<_>>()
        .join("\n");
    Ok((metadata, body))
}

fn parse_yaml_map(yaml: &str) -> Result<BTreeMap<String, Value>, ParseError> {
    if yaml.trim().is_empty() {
        return Err(ParseError::NotAMapping);
    }
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|err| ParseError::Yaml(err.to_string()))?;
    let json_value: Value =
        serde_json::to_value(yaml_value).map_err(|err| ParseError::Yaml(err.to_string()))?;
    match json_value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(ParseError::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_split() {
        let input = "---\nslug: maya-chen\ntier: 1\n---\n# Maya Chen\nBody text";
        let (fm, body) = split_document(input).unwrap();
        assert_eq!(fm["slug"], Value::String("maya-chen".into()));
        assert_eq!(fm["tier"], Value::from(1));
        assert_eq!(body, "# Maya Chen\nBody text");
    }

    #[test]
    fn arrays_survive() {
        let input = "---\nslug: s\nbeliefs:\n  - the-static\n  - clean-signal\n---\n";
        let (fm, _) = split_document(input).unwrap();
        let beliefs = fm["beliefs"].as_array().unwrap();
        assert_eq!(beliefs.len(), 2);
        assert_eq!(beliefs[0], Value::String("the-static".into()));
    }

    #[test]
    fn bom_tolerated() {
        let input = "\u{feff}---\nslug: s\n---\nbody";
        let (fm, body) = split_document(input).unwrap();
        assert_eq!(fm["slug"], Value::String("s".into()));
        assert_eq!(body, "body");
    }

    #[test]
    fn dots_terminator() {
        let input = "---\nslug: s\n...\nbody";
        let (_, body) = split_document(input).unwrap();
        assert_eq!(body, "body");
    }

    #[test]
    fn missing_block() {
        assert_eq!(
            split_document("# Title\nBody"),
            Err(ParseError::MissingFrontmatter)
        );
        assert_eq!(split_document(""), Err(ParseError::MissingFrontmatter));
    }

    #[test]
    fn unterminated_block() {
        assert_eq!(
            split_document("---\nslug: s\nno closing fence"),
            Err(ParseError::MissingFrontmatter)
        );
    }

    #[test]
    fn empty_block_rejected() {
        assert_eq!(split_document("---\n---\nbody"), Err(ParseError::NotAMapping));
    }

    #[test]
    fn scalar_block_rejected() {
        assert_eq!(
            split_document("---\njust a string\n---\n"),
            Err(ParseError::NotAMapping)
        );
    }
}
