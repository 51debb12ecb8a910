//! Front-matter parser
//!
//! Reads the leading `---` YAML block of a content file into typed
//! [`EntityTags`]. Only the inclusion keys matter here; any other key in the
//! block (description, globs, ...) belongs to the generator and is ignored.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::domain::entities::{EntityTags, FrontMatter};

/// Delimiter for frontmatter sections
const FRONTMATTER_DELIMITER: &str = "---";

/// Extensions whose files may carry front-matter
const FRONTMATTER_EXTENSIONS: &[&str] = &["md", "mdc", "markdown"];

/// Result of extracting frontmatter from content
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFrontmatter<'a> {
    /// The raw YAML content of the frontmatter
    pub yaml: String,
    /// The content body after the frontmatter
    pub body: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontmatterError {
    #[error("front-matter block is not closed with '---'")]
    Unclosed,
    #[error("invalid front-matter YAML: {0}")]
    Yaml(String),
}

/// Either one tag or a list of tags
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Trimmed, non-blank tags
    fn into_set(self) -> BTreeSet<String> {
        let tags = match self {
            OneOrMany::One(tag) => vec![tag],
            OneOrMany::Many(tags) => tags,
        };
        tags.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct TagFields {
    #[serde(default, rename = "include-in", alias = "include_in")]
    include: Option<OneOrMany>,
    #[serde(default, rename = "exclude-from", alias = "exclude_from")]
    exclude: Option<OneOrMany>,
}

/// Extract frontmatter from file content
///
/// Returns `Ok(None)` when the content does not open with a `---` line.
///
/// # Example
/// ```text
/// ---
/// exclude-from: [research]
/// ---
/// # Rule content here
/// ```
pub fn extract_frontmatter(content: &str) -> Result<Option<ExtractedFrontmatter<'_>>, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == FRONTMATTER_DELIMITER => {}
        _ => return Ok(None),
    }

    let mut offset = content.find('\n').map(|i| i + 1).unwrap_or(content.len());
    let mut yaml_lines = Vec::new();
    for line in lines {
        offset += line.len();
        if line.trim_end() == FRONTMATTER_DELIMITER {
            return Ok(Some(ExtractedFrontmatter {
                yaml: yaml_lines.join(""),
                body: &content[offset..],
            }));
        }
        yaml_lines.push(line);
    }

    Err(FrontmatterError::Unclosed)
}

/// Parse the tag keys out of frontmatter YAML
pub fn parse_tags(yaml: &str) -> Result<EntityTags, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(EntityTags::unconditional());
    }

    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;
    if value.is_null() {
        return Ok(EntityTags::unconditional());
    }
    if !value.is_mapping() {
        return Err(FrontmatterError::Yaml("expected a mapping of keys".to_string()));
    }

    let fields: TagFields =
        serde_yaml_ng::from_value(value).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;

    Ok(EntityTags {
        // An empty include set matches no profile; an empty exclude set drops nothing
        include: fields.include.map(OneOrMany::into_set),
        exclude: fields
            .exclude
            .map(OneOrMany::into_set)
            .filter(|set| !set.is_empty()),
    })
}

/// Whether a file at `path` is expected to carry front-matter
pub fn may_have_frontmatter(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRONTMATTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read the inclusion filter of a content file.
///
/// Never fails: files without a block are unconditional, and a broken
/// block is reported as [`FrontMatter::Malformed`] for the caller's policy.
pub fn read_front_matter(path: &Path, bytes: &[u8]) -> FrontMatter {
    if !may_have_frontmatter(path) {
        return FrontMatter::default();
    }
    let Ok(content) = std::str::from_utf8(bytes) else {
        return FrontMatter::default();
    };

    let result = extract_frontmatter(content)
        .and_then(|extracted| extracted.map(|e| parse_tags(&e.yaml)).transpose());

    match result {
        Ok(Some(tags)) => FrontMatter::Tags(tags),
        Ok(None) => FrontMatter::default(),
        Err(e) => FrontMatter::Malformed(e.to_string()),
    }
}
