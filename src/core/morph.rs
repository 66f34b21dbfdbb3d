//! Gender morph adapter: rewrites masculine sentences into the feminine.
//!
//! Each whitespace-delimited word is decomposed into an optional clitic
//! prefix, a core, and trailing punctuation, then looked up in the rule
//! table. Unknown words pass through untouched.

use tracing::{debug, trace};

use crate::core::rules::{is_ignorable_mark, lookup_key, RuleTable};
use crate::schema::gender::GenderProfile;

const DEFINITE_ARTICLE: &str = "ال";

/// A one-letter particle written joined to the following word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clitic {
    /// و "and"
    Wa,
    /// ف "so"
    Fa,
    /// ب "with, by"
    Bi,
}

impl Clitic {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'و' => Some(Self::Wa),
            'ف' => Some(Self::Fa),
            'ب' => Some(Self::Bi),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Wa => 'و',
            Self::Fa => 'ف',
            Self::Bi => 'ب',
        }
    }
}

/// One word split into `prefix + core + suffix`. All three slices borrow
/// from the original word, so `prefix + core + suffix` reproduces it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub clitic: Option<Clitic>,
    /// The clitic letter plus any marks written on it; empty without a clitic.
    pub prefix: &'a str,
    pub core: &'a str,
    /// Trailing punctuation (anything that is neither a letter, a digit nor
    /// an Arabic mark).
    pub suffix: &'a str,
}

fn is_trailing_punct(c: char) -> bool {
    !c.is_alphanumeric() && !is_ignorable_mark(c)
}

impl<'a> Token<'a> {
    /// Decompose a single word. Never fails; a word made only of
    /// punctuation has an empty core.
    pub fn decompose(word: &'a str) -> Token<'a> {
        let body_end = word
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_trailing_punct(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(word.len());
        let (body, suffix) = word.split_at(body_end);

        let mut chars = body.chars();
        let clitic = chars.next().and_then(Clitic::from_char);
        if let Some(clitic) = clitic {
            let after_letter = &body[clitic.as_char().len_utf8()..];
            let marks_len: usize = after_letter
                .chars()
                .take_while(|c| is_ignorable_mark(*c))
                .map(char::len_utf8)
                .sum();
            let (marks, rest) = after_letter.split_at(marks_len);
            // Only split when a real letter remains for the core.
            if rest.chars().any(|c| !is_ignorable_mark(c)) {
                let prefix_len = clitic.as_char().len_utf8() + marks.len();
                return Token {
                    clitic: Some(clitic),
                    prefix: &body[..prefix_len],
                    core: rest,
                    suffix,
                };
            }
        }

        Token {
            clitic: None,
            prefix: "",
            core: body,
            suffix,
        }
    }

    /// Reassemble the word exactly as written.
    pub fn original(&self) -> String {
        format!("{}{}{}", self.prefix, self.core, self.suffix)
    }
}

/// Which lookup produced a replacement, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupBranch {
    /// The clitic and core matched together as one key.
    Combined,
    /// The core alone matched; the clitic is re-attached.
    Core,
    /// The core minus the definite article matched; the article is
    /// re-prepended.
    DefiniteArticle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub text: String,
    pub branch: LookupBranch,
}

/// Rewrites masculine text against a rule table.
#[derive(Debug, Clone, Copy)]
pub struct GenderMorphAdapter<'t> {
    table: &'t RuleTable,
}

impl Default for GenderMorphAdapter<'static> {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}

impl<'t> GenderMorphAdapter<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    /// Adapt `text` to `gender`.
    ///
    /// Masculine returns the input unchanged. Feminine rewrites each word
    /// found in the table and joins words with single spaces. Never fails.
    pub fn adapt(&self, text: &str, gender: GenderProfile) -> String {
        if gender.is_identity() {
            return text.to_string();
        }

        let mut replaced = 0usize;
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                let token = Token::decompose(word);
                match self.adapt_token(&token) {
                    Some(adapted) => {
                        replaced += 1;
                        adapted
                    }
                    None => word.to_string(),
                }
            })
            .collect();

        debug!(words = words.len(), replaced, "adapted text to feminine");
        words.join(" ")
    }

    /// The adapted form of one token, or `None` when the table has no entry
    /// for it. Callers keep the original word on `None`.
    pub fn adapt_token(&self, token: &Token<'_>) -> Option<String> {
        self.resolve(token)
            .map(|replacement| replacement.text)
    }

    /// Resolve a token against the table, reporting which branch matched.
    pub fn resolve(&self, token: &Token<'_>) -> Option<Replacement> {
        let core_key = lookup_key(token.core);
        if core_key.is_empty() {
            return None;
        }

        if token.clitic.is_some() {
            let combined_key = lookup_key(&format!("{}{}", token.prefix, token.core));
            if let Some(feminine) = self.table.lookup_normalized(&combined_key) {
                trace!(word = %token.original(), feminine, "combined match");
                return Some(Replacement {
                    text: format!("{}{}", feminine, token.suffix),
                    branch: LookupBranch::Combined,
                });
            }
        }

        if let Some(feminine) = self.table.lookup_normalized(&core_key) {
            trace!(word = %token.original(), feminine, "core match");
            return Some(Replacement {
                text: format!("{}{}{}", token.prefix, feminine, token.suffix),
                branch: LookupBranch::Core,
            });
        }

        let stem = core_key.strip_prefix(DEFINITE_ARTICLE)?;
        if stem.is_empty() {
            return None;
        }
        let feminine = self.table.lookup_normalized(stem)?;
        trace!(word = %token.original(), feminine, "definite-article match");
        Some(Replacement {
            text: format!(
                "{}{}{}{}",
                token.prefix, DEFINITE_ARTICLE, feminine, token.suffix
            ),
            branch: LookupBranch::DefiniteArticle,
        })
    }
}

/// Adapt `text` using the built-in rule table.
pub fn adapt(text: &str, gender: GenderProfile) -> String {
    GenderMorphAdapter::default().adapt(text, gender)
}
