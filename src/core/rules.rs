//! Masculine → feminine lexical rule table.
//!
//! Keys are stored in lookup form (diacritics and tatweel removed, hamzated
//! alefs folded to bare alef). The table is read-only once built; the
//! built-in table is initialized on first use and shared process-wide.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::morph::GenderMorphAdapter;
use crate::schema::gender::GenderProfile;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule has an empty masculine key")]
    EmptyKey,
    #[error("duplicate rule key '{key}' (from '{first}' and '{second}')")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("feminine form '{value}' of '{key}' is itself a masculine key")]
    ValueIsKey { key: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A single masculine → feminine pair as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub masculine: String,
    pub feminine: String,
}

/// A problem found by [`RuleTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssue {
    /// A feminine form normalizes to a masculine key.
    ValueIsKey { key: String, value: String },
    /// A feminine form is rewritten again when the adapter is re-applied,
    /// either bare or behind the definite article.
    Reentrant {
        key: String,
        value: String,
        readapted: String,
    },
}

impl std::fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValueIsKey { key, value } => {
                write!(f, "feminine form '{value}' of '{key}' is itself a key")
            }
            Self::Reentrant {
                key,
                value,
                readapted,
            } => write!(
                f,
                "feminine form '{value}' of '{key}' re-adapts to '{readapted}'"
            ),
        }
    }
}

/// Tashkeel (U+064B..=U+065F), superscript alef (U+0670) and tatweel (U+0640).
pub fn is_ignorable_mark(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

/// Reduce a word to its lookup form: marks stripped, أ/إ/آ folded to ا.
pub fn lookup_key(word: &str) -> String {
    word.chars()
        .filter(|c| !is_ignorable_mark(*c))
        .map(|c| match c {
            'أ' | 'إ' | 'آ' => 'ا',
            other => other,
        })
        .collect()
}

/// The immutable rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    pub version: u32,
    pub dialect: String,
    rules: FxHashMap<String, String>,
    /// Authored masculine form per key, kept for diagnostics.
    authored: FxHashMap<String, String>,
}

// On-disk shape: `(version: 1, dialect: "...", rules: [("masc", "fem"), ...])`.
// A list rather than a map so duplicate keys are reported instead of
// silently collapsed.
#[derive(Debug, Deserialize)]
struct RonRuleFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    dialect: String,
    rules: Vec<(String, String)>,
}

fn default_version() -> u32 {
    1
}

static BUILTIN: Lazy<RuleTable> = Lazy::new(|| {
    let mut table = RuleTable {
        version: 1,
        dialect: "egyptian".to_string(),
        ..RuleTable::default()
    };
    for (masculine, feminine) in BUILTIN_RULES {
        table.insert_unchecked(masculine, feminine);
    }
    table
});

impl RuleTable {
    /// The built-in table, initialized once and shared by every caller.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    /// Build a table from authored entries, enforcing that keys are unique
    /// and that no feminine form is itself a key.
    pub fn from_entries<I>(version: u32, dialect: &str, entries: I) -> Result<RuleTable, RuleError>
    where
        I: IntoIterator<Item = RuleEntry>,
    {
        let mut table = RuleTable {
            version,
            dialect: dialect.to_string(),
            ..RuleTable::default()
        };
        for entry in entries {
            let key = lookup_key(entry.masculine.trim());
            if key.is_empty() {
                return Err(RuleError::EmptyKey);
            }
            if let Some(first) = table.authored.get(&key) {
                return Err(RuleError::DuplicateKey {
                    key,
                    first: first.clone(),
                    second: entry.masculine,
                });
            }
            table.insert_unchecked(entry.masculine.trim(), entry.feminine.trim());
        }
        table.check_values()?;
        Ok(table)
    }

    /// Load a table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RuleTable, RuleError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a table from a RON string.
    pub fn parse_ron(input: &str) -> Result<RuleTable, RuleError> {
        let raw: RonRuleFile = ron::from_str(input)?;
        Self::from_entries(
            raw.version,
            &raw.dialect,
            raw.rules.into_iter().map(|(masculine, feminine)| RuleEntry {
                masculine,
                feminine,
            }),
        )
    }

    /// Merge another table into this one. Rules from `other` override rules
    /// in `self` with the same key. The merged table must still satisfy the
    /// no-value-is-a-key invariant; on failure `self` is left unchanged.
    pub fn merge(&mut self, other: RuleTable) -> Result<(), RuleError> {
        let mut merged = self.clone();
        for (key, value) in other.rules {
            if let Some(authored) = other.authored.get(&key) {
                merged.authored.insert(key.clone(), authored.clone());
            }
            merged.rules.insert(key, value);
        }
        merged.version = self.version.max(other.version);
        if !other.dialect.is_empty() {
            merged.dialect = other.dialect;
        }
        merged.check_values()?;
        *self = merged;
        Ok(())
    }

    /// Explicit optional lookup of a raw word. Normalizes before matching.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.lookup_normalized(&lookup_key(word))
    }

    /// Lookup of a word already in lookup form.
    pub fn lookup_normalized(&self, key: &str) -> Option<&str> {
        self.rules.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, word: &str) -> bool {
        self.rules.contains_key(&lookup_key(word))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All entries, sorted by masculine form for stable output.
    pub fn entries(&self) -> Vec<RuleEntry> {
        let mut entries: Vec<RuleEntry> = self
            .rules
            .iter()
            .map(|(key, value)| RuleEntry {
                masculine: self.authored.get(key).cloned().unwrap_or_else(|| key.clone()),
                feminine: value.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.masculine.cmp(&b.masculine));
        entries
    }

    /// Full consistency check, including the adapter-level re-entrancy a
    /// plain key/value comparison cannot see (a feminine form that starts
    /// with a clitic letter, or carries the definite article).
    pub fn validate(&self) -> Vec<RuleIssue> {
        let adapter = GenderMorphAdapter::new(self);
        let mut issues = Vec::new();
        for entry in self.entries() {
            let key = lookup_key(&entry.masculine);
            if self.rules.contains_key(&lookup_key(&entry.feminine)) {
                issues.push(RuleIssue::ValueIsKey {
                    key,
                    value: entry.feminine,
                });
                continue;
            }
            for probe in [entry.feminine.clone(), format!("ال{}", entry.feminine)] {
                let readapted = adapter.adapt(&probe, GenderProfile::Feminine);
                if readapted != probe {
                    issues.push(RuleIssue::Reentrant {
                        key: key.clone(),
                        value: probe,
                        readapted,
                    });
                    break;
                }
            }
        }
        issues
    }

    fn insert_unchecked(&mut self, masculine: &str, feminine: &str) {
        let key = lookup_key(masculine);
        self.authored.insert(key.clone(), masculine.to_string());
        self.rules.insert(key, feminine.to_string());
    }

    fn check_values(&self) -> Result<(), RuleError> {
        let mut offending: Vec<(&String, &String)> = self
            .rules
            .iter()
            .filter(|(_, value)| self.rules.contains_key(&lookup_key(value)))
            .collect();
        offending.sort();
        match offending.first() {
            Some((key, value)) => Err(RuleError::ValueIsKey {
                key: (*key).clone(),
                value: (*value).clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Built-in vocabulary: the words the storybook templates inflect for the
/// hero. Egyptian colloquial forms alongside their Modern Standard cousins.
///
/// Kept free of short keys that are also the tail of a common
/// clitic-prefixed word ("رد" would hit "ورد", "جه" would hit "وجه"), and of
/// words the templates also use for other characters ("كان" in the
/// "كان يا ما كان" opening, "يساعد" for a parent helping).
#[rustfmt::skip]
const BUILTIN_RULES: &[(&str, &str)] = &[
    // nouns
    ("ولد", "بنت"),
    ("بطل", "بطلة"),
    ("بطلنا", "بطلتنا"),
    ("حبيبي", "حبيبتي"),
    ("أرنب", "أرنبة"),
    // pronouns
    ("هو", "هي"),
    ("إنت", "إنتي"),
    // past-tense verbs, third person
    ("قال", "قالت"),
    ("فكر", "فكرت"),
    ("وقف", "وقفت"),
    ("راح", "راحت"),
    ("مسك", "مسكت"),
    ("أخد", "أخدت"),
    ("سقى", "سقت"),
    ("ذهب", "ذهبت"),
    ("استيقظ", "استيقظت"),
    ("غسل", "غسلت"),
    ("وجد", "وجدت"),
    ("تذكر", "تذكرت"),
    ("نادى", "نادت"),
    ("خاف", "خافت"),
    ("ركل", "ركلت"),
    ("اقترب", "اقتربت"),
    ("سحب", "سحبت"),
    // imperfect verbs, third person
    ("يلعب", "تلعب"),
    ("بيلعب", "بتلعب"),
    ("يحب", "تحب"),
    ("بيحب", "بتحب"),
    ("يقفز", "تقفز"),
    // adjectives
    ("شجاع", "شجاعة"),
    ("خايف", "خايفة"),
    ("صادق", "صادقة"),
    ("فرحان", "فرحانة"),
    ("حزين", "حزينة"),
    ("جعان", "جعانة"),
    ("عاوز", "عاوزة"),
    ("سعيد", "سعيدة"),
    ("كريم", "كريمة"),
    ("صغير", "صغيرة"),
    ("شاطر", "شاطرة"),
    ("آسف", "آسفة"),
    // nouns carrying the third-person masculine suffix
    ("صاحبه", "صاحبها"),
    ("أصحابه", "أصحابها"),
    ("صديقه", "صديقها"),
    ("أصدقاءه", "أصدقاءها"),
    ("حضنته", "حضنتها"),
    ("سأله", "سألها"),
    ("ضهره", "ضهرها"),
    ("عنده", "عندها"),
    ("وجهه", "وجهها"),
    ("فطوره", "فطورها"),
    ("اسمه", "اسمها"),
    ("لعبته", "لعبتها"),
];
