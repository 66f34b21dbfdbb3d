use serde::{Deserialize, Serialize};

/// Grammatical gender of the child a storybook is personalized for.
///
/// Templates are authored in the masculine, so `Masculine` is always the
/// identity transform and `Feminine` is the only profile that rewrites text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GenderProfile {
    /// ولد: the authored form, left untouched.
    #[default]
    Masculine,
    /// بنت: rewritten through the rule table.
    Feminine,
}

impl GenderProfile {
    /// Parse a gender label as collected from a parent.
    ///
    /// Accepts the Arabic words used in conversation ("ولد", "بنت") as well
    /// as English labels. Latin labels are case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        match label {
            "ولد" | "صبي" => return Some(Self::Masculine),
            "بنت" => return Some(Self::Feminine),
            _ => {}
        }
        match label.to_ascii_lowercase().as_str() {
            "boy" | "masculine" | "male" | "m" => Some(Self::Masculine),
            "girl" | "feminine" | "female" | "f" => Some(Self::Feminine),
            _ => None,
        }
    }

    /// True when adapting to this profile never changes the text.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Masculine)
    }

    /// The Arabic noun for a child of this gender.
    pub fn child_noun(&self) -> &'static str {
        match self {
            Self::Masculine => "ولد",
            Self::Feminine => "بنت",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_masculine() {
        assert_eq!(GenderProfile::default(), GenderProfile::Masculine);
        assert!(GenderProfile::default().is_identity());
    }

    #[test]
    fn parse_arabic_labels() {
        assert_eq!(GenderProfile::from_label("ولد"), Some(GenderProfile::Masculine));
        assert_eq!(GenderProfile::from_label(" بنت "), Some(GenderProfile::Feminine));
    }

    #[test]
    fn parse_english_labels_case_insensitive() {
        assert_eq!(GenderProfile::from_label("Girl"), Some(GenderProfile::Feminine));
        assert_eq!(GenderProfile::from_label("BOY"), Some(GenderProfile::Masculine));
        assert_eq!(GenderProfile::from_label("f"), Some(GenderProfile::Feminine));
    }

    #[test]
    fn parse_unknown_label() {
        assert_eq!(GenderProfile::from_label("unknown"), None);
        assert_eq!(GenderProfile::from_label(""), None);
    }

    #[test]
    fn child_nouns() {
        assert_eq!(GenderProfile::Masculine.child_noun(), "ولد");
        assert_eq!(GenderProfile::Feminine.child_noun(), "بنت");
        assert!(!GenderProfile::Feminine.is_identity());
    }
}
