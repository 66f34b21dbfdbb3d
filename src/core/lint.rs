//! Residual-marker linter for adapted text.
//!
//! The rule table is hand-authored, so coverage gaps are silent: a
//! masculine word missing from the table passes through unchanged. The
//! linter scans feminine output for surface shapes that usually mean
//! masculine agreement survived. Findings are heuristics and are reported
//! as warnings only.

use rustc_hash::FxHashSet;
use std::fmt;
use tracing::warn;

use crate::core::morph::{GenderMorphAdapter, Token};
use crate::core::rules::{lookup_key, RuleTable};

/// Independent masculine pronouns, in lookup form.
const MASCULINE_PRONOUNS: &[&str] = &["هو", "هوا", "هوه", "انتا"];

/// Common words that match a marker shape without being masculine.
const DEFAULT_ALLOWED: &[&str] = &[
    "يوم", "يا", "يلا", "ياه", "يمين", "يعني", "الله", "فيه", "ليه", "ايه", "كده", "وجه",
    "بيت", "بيوت", "انتبه", "شبه", "مياه",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidualMarker {
    /// هو and its colloquial spellings.
    IndependentPronoun,
    /// A verb with the masculine imperfect prefix ي, optionally behind the
    /// colloquial continuous ب.
    ImperfectPrefix,
    /// A word ending in the third-person masculine possessive ه.
    PossessiveSuffix,
    /// A word the rule table would still rewrite.
    TableKey,
}

impl fmt::Display for ResidualMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IndependentPronoun => "masculine pronoun",
            Self::ImperfectPrefix => "masculine imperfect prefix",
            Self::PossessiveSuffix => "masculine possessive suffix",
            Self::TableKey => "unadapted rule key",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    /// Position of the word among the whitespace-separated words.
    pub index: usize,
    pub token: String,
    pub marker: ResidualMarker,
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "word {} '{}': {}", self.index, self.token, self.marker)
    }
}

pub struct Linter<'t> {
    adapter: GenderMorphAdapter<'t>,
    allowed: FxHashSet<String>,
}

impl<'t> Linter<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            adapter: GenderMorphAdapter::new(table),
            allowed: DEFAULT_ALLOWED.iter().map(|w| lookup_key(w)).collect(),
        }
    }

    /// Add words that should never be flagged.
    pub fn allow<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed
            .extend(words.into_iter().map(|w| lookup_key(w.as_ref())));
        self
    }

    /// Scan `text`, which should already be adapted to the feminine.
    pub fn lint(&self, text: &str) -> Vec<LintFinding> {
        let findings: Vec<LintFinding> = text
            .split_whitespace()
            .enumerate()
            .filter_map(|(index, word)| {
                self.classify(word).map(|marker| LintFinding {
                    index,
                    token: word.to_string(),
                    marker,
                })
            })
            .collect();

        for finding in &findings {
            warn!(
                index = finding.index,
                token = %finding.token,
                marker = %finding.marker,
                "possible residual masculine form"
            );
        }
        findings
    }

    fn classify(&self, word: &str) -> Option<ResidualMarker> {
        if word.contains('{') {
            return None;
        }
        let token = Token::decompose(word);
        let core = lookup_key(token.core);
        if core.is_empty() {
            return None;
        }
        let whole = lookup_key(&format!("{}{}", token.prefix, token.core));
        let stem = core.strip_prefix("ال").unwrap_or(&core);
        if [whole.as_str(), core.as_str(), stem]
            .iter()
            .any(|k| self.allowed.contains(*k))
        {
            return None;
        }

        if self.adapter.resolve(&token).is_some() {
            return Some(ResidualMarker::TableKey);
        }
        if MASCULINE_PRONOUNS.contains(&whole.as_str()) {
            return Some(ResidualMarker::IndependentPronoun);
        }
        let letters = core.chars().count();
        if (core.starts_with('ي') && letters >= 3)
            || (core.starts_with("بي") && letters >= 4)
        {
            return Some(ResidualMarker::ImperfectPrefix);
        }
        if stem.ends_with('ه') && stem.chars().count() >= 3 {
            return Some(ResidualMarker::PossessiveSuffix);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lint(text: &str) -> Vec<LintFinding> {
        Linter::new(RuleTable::builtin()).lint(text)
    }

    fn markers(text: &str) -> Vec<(usize, ResidualMarker)> {
        lint(text).into_iter().map(|f| (f.index, f.marker)).collect()
    }

    #[test]
    fn clean_feminine_text_has_no_findings() {
        assert!(lint("قالت البنت الشجاعة").is_empty());
        assert!(lint("بطلتنا فكرت.. هي مش خايفة، هي صادقة.").is_empty());
    }

    #[test]
    fn unadapted_table_words_are_flagged() {
        assert_eq!(
            markers("قال الولد"),
            vec![(0, ResidualMarker::TableKey), (1, ResidualMarker::TableKey)]
        );
    }

    #[test]
    fn heuristic_markers() {
        assert_eq!(
            markers("هوه يجري ومسكت كتابه"),
            vec![
                (0, ResidualMarker::IndependentPronoun),
                (1, ResidualMarker::ImperfectPrefix),
                (3, ResidualMarker::PossessiveSuffix),
            ]
        );
    }

    #[test]
    fn continuous_prefix_behind_clitic() {
        assert_eq!(markers("وبيجري"), vec![(0, ResidualMarker::ImperfectPrefix)]);
    }

    #[test]
    fn allowed_words_are_skipped() {
        assert!(lint("كان يا ما كان في يوم").is_empty());
        assert!(lint("الله! كده؟ ليه؟").is_empty());
    }

    #[test]
    fn extra_allowed_words() {
        let linter = Linter::new(RuleTable::builtin()).allow(["يجري"]);
        assert!(linter.lint("يجري").is_empty());
    }

    #[test]
    fn placeholders_are_ignored() {
        assert!(lint("{child_name} {value}").is_empty());
    }

    #[test]
    fn finding_display_names_the_marker() {
        let finding = &lint("كتابه")[0];
        assert_eq!(finding.to_string(), "word 0 'كتابه': masculine possessive suffix");
    }
}
