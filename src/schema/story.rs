//! Story content: page templates with name placeholders, grouped by age.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::gender::GenderProfile;

/// Age group used when a requested group has no content.
pub const DEFAULT_AGE_GROUP: &str = "default";

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("no value bound for placeholder '{{{0}}}'")]
    UnboundPlaceholder(String),
    #[error("story has no pages for age group '{0}' and no default group")]
    MissingAgeGroup(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed page template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// A named slot such as `{child_name}`.
    Placeholder(String),
}

/// A parsed page template: literal Arabic prose interleaved with
/// placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{name}` → `Placeholder`
    /// - `{{` / `}}` → literal `{` / `}`
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, StoryError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(
                            &mut literal_buf,
                        )));
                    }

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(StoryError::TemplateParse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(StoryError::TemplateParse("unclosed brace".to_string()));
                    }

                    let name: String = chars[start..end].iter().collect();
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(StoryError::TemplateParse("empty braces".to_string()));
                    }
                    segments.push(TemplateSegment::Placeholder(name.to_string()));
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(StoryError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    /// Names of all placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Placeholder(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Fill every placeholder from `bindings`.
    pub fn render(&self, bindings: &FxHashMap<&str, &str>) -> Result<String, StoryError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Placeholder(name) => {
                    let value = bindings
                        .get(name.as_str())
                        .ok_or_else(|| StoryError::UnboundPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// The child a book is personalized for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub name: String,
    #[serde(default)]
    pub gender: GenderProfile,
}

impl ChildProfile {
    pub fn new(name: impl Into<String>, gender: GenderProfile) -> Self {
        Self {
            name: name.into(),
            gender,
        }
    }

    /// Placeholder bindings for a page: `child_name` and the book's `value`.
    pub fn bindings<'a>(&'a self, value: &'a str) -> FxHashMap<&'a str, &'a str> {
        let mut map = FxHashMap::default();
        map.insert("child_name", self.name.as_str());
        map.insert("value", value);
        map
    }
}

/// One page of a story, authored in the masculine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub page_number: u32,
    pub text: String,
    /// Illustration prompt handed to the image service; not used for layout.
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroup {
    #[serde(default)]
    pub style: String,
    pub pages: Vec<StoryPage>,
}

/// A themed story with content per age group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBook {
    pub title: String,
    /// The moral value the story teaches, bound to `{value}`.
    pub value: String,
    pub age_groups: HashMap<String, AgeGroup>,
}

impl StoryBook {
    /// Load a story book from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<StoryBook, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a story book from a RON string. Every page template is parsed
    /// once here so malformed braces surface at load time.
    pub fn parse_ron(input: &str) -> Result<StoryBook, StoryError> {
        let book: StoryBook = ron::from_str(input)?;
        for group in book.age_groups.values() {
            for page in &group.pages {
                Template::parse(&page.text)?;
            }
        }
        Ok(book)
    }

    /// Pages for an age group, falling back to the `default` group.
    pub fn pages_for(&self, age_group: &str) -> Result<&[StoryPage], StoryError> {
        self.age_groups
            .get(age_group)
            .or_else(|| self.age_groups.get(DEFAULT_AGE_GROUP))
            .map(|group| group.pages.as_slice())
            .ok_or_else(|| StoryError::MissingAgeGroup(age_group.to_string()))
    }

    /// Iterate over every page in every age group.
    pub fn all_pages(&self) -> impl Iterator<Item = (&str, &StoryPage)> {
        self.age_groups
            .iter()
            .flat_map(|(name, group)| group.pages.iter().map(move |p| (name.as_str(), p)))
    }
}
