//! Moderation vocabularies and per-frame classification.
//!
//! Vocabularies come from a closed set of [`ModerationCategory`] values, each
//! carrying a fixed phrase list, or from a user-supplied phrase list that
//! overrides the category's defaults.
//!
//! Matching is exact, case-insensitive token equality between a frame's
//! keywords and the vocabulary entries. Keywords are single tokens, so
//! multi-word entries such as `"child abuse"` never match.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::keywords::KeywordSet;

// ---------------------------------------------------------------------------
// Category phrase lists
// ---------------------------------------------------------------------------

const VIOLENCE: &[&str] = &[
    "violence", "violent", "fight", "fighting", "weapon", "gun", "knife", "blood", "injury",
    "injured", "attack", "attacking", "hit", "hitting", "punch", "punching", "kick", "kicking",
    "harm", "harming", "assault", "assaulting", "battle", "war", "conflict", "abuse", "abusing",
    "threat", "threatening", "danger", "dangerous", "hurt", "hurting", "wound", "wounding",
];

const SEXUAL_CONTENT: &[&str] = &[
    "nude", "nudity", "naked", "sexual", "sex", "explicit", "pornography", "pornographic",
    "adult content", "erotic", "obscene", "intimate", "revealing", "inappropriate",
    "suggestive", "lewd", "indecent", "provocative", "sensual", "seductive",
];

const TERRORISM: &[&str] = &[
    "terrorism", "terrorist", "extremist", "extremism", "radical", "radicalization", "bomb",
    "bombing", "explosive", "attack", "jihad", "militant", "hostage", "propaganda",
    "recruitment", "indoctrination", "manifesto", "hate speech", "supremacist", "insurgent",
    "insurgency", "militia", "violent ideology",
];

const CHILD_SAFETY: &[&str] = &[
    "child abuse", "child exploitation", "minor", "underage", "child endangerment",
    "child safety", "child harm", "child protection", "child victim", "child predator",
    "grooming", "trafficking", "exploitation", "vulnerable", "youth", "adolescent", "infant",
    "toddler", "baby", "school", "playground", "classroom",
];

const GRAPHIC_CONTENT: &[&str] = &[
    "graphic", "disturbing", "gore", "gory", "gruesome", "brutal", "horrific", "shocking",
    "distressing", "traumatic", "upsetting", "offensive", "unsettling", "violent scene",
    "blood", "injury", "accident", "disaster", "death", "corpse", "mutilation", "torture",
    "suffering", "medical procedure", "surgery",
];

// ---------------------------------------------------------------------------
// ModerationCategory
// ---------------------------------------------------------------------------

/// The named moderation categories a run can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationCategory {
    Violence,
    SexualContent,
    Terrorism,
    ChildSafety,
    GraphicContent,
}

impl ModerationCategory {
    pub const ALL: [ModerationCategory; 5] = [
        Self::Violence,
        Self::SexualContent,
        Self::Terrorism,
        Self::ChildSafety,
        Self::GraphicContent,
    ];

    /// Parse from the configuration name (e.g. `violence`).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                CoreError::InvalidConfig(format!(
                    "Unknown moderation category '{name}' (expected one of: {})",
                    valid.join(", ")
                ))
            })
    }

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Violence => "violence",
            Self::SexualContent => "sexual_content",
            Self::Terrorism => "terrorism",
            Self::ChildSafety => "child_safety",
            Self::GraphicContent => "graphic_content",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Violence => "Violence Detection",
            Self::SexualContent => "Sexual Content/Nudity",
            Self::Terrorism => "Terrorism and Extremist Content",
            Self::ChildSafety => "Child Safety and Exploitation",
            Self::GraphicContent => "Graphic or Disturbing Content",
        }
    }

    /// Predefined phrases for this category, in their canonical order.
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Self::Violence => VIOLENCE,
            Self::SexualContent => SEXUAL_CONTENT,
            Self::Terrorism => TERRORISM,
            Self::ChildSafety => CHILD_SAFETY,
            Self::GraphicContent => GRAPHIC_CONTENT,
        }
    }
}

// ---------------------------------------------------------------------------
// ModerationVocabulary
// ---------------------------------------------------------------------------

/// The single vocabulary active for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVocabulary {
    /// A category's predefined phrase list.
    Category(ModerationCategory),
    /// User-supplied phrases reported under `category`'s label.
    Custom {
        category: ModerationCategory,
        phrases: Vec<String>,
    },
}

impl ModerationVocabulary {
    /// Parse a comma-separated phrase list. Blank entries are dropped.
    pub fn custom(category: ModerationCategory, list: &str) -> Result<Self, CoreError> {
        let phrases: Vec<String> = list
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if phrases.is_empty() {
            return Err(CoreError::InvalidConfig(
                "Custom moderation keyword list must contain at least one phrase".to_string(),
            ));
        }

        Ok(Self::Custom { category, phrases })
    }

    pub fn category(&self) -> ModerationCategory {
        match self {
            Self::Category(c) => *c,
            Self::Custom { category, .. } => *category,
        }
    }

    pub fn label(&self) -> &'static str {
        self.category().label()
    }

    pub fn phrases(&self) -> Vec<&str> {
        match self {
            Self::Category(c) => c.phrases().to_vec(),
            Self::Custom { phrases, .. } => phrases.iter().map(String::as_str).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// ModerationScorer
// ---------------------------------------------------------------------------

/// Classifies keyword sets against one vocabulary.
///
/// Entries are lowercased once at construction; the scorer is immutable and
/// shared across all frames of a run.
#[derive(Debug, Clone)]
pub struct ModerationScorer {
    label: &'static str,
    entries: HashSet<String>,
}

impl ModerationScorer {
    pub fn new(vocabulary: &ModerationVocabulary) -> Self {
        Self {
            label: vocabulary.label(),
            entries: vocabulary
                .phrases()
                .into_iter()
                .map(str::to_lowercase)
                .collect(),
        }
    }

    /// Report label of the underlying category.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether a single keyword equals a vocabulary entry, ignoring case.
    pub fn is_match(&self, keyword: &str) -> bool {
        self.entries.contains(&keyword.to_lowercase())
    }

    /// True iff any keyword exactly matches any vocabulary entry.
    pub fn classify(&self, keywords: &KeywordSet) -> bool {
        keywords.iter().any(|k| self.is_match(k))
    }

    /// Keywords that matched, in keyword rank order.
    pub fn matched_keywords(&self, keywords: &KeywordSet) -> Vec<String> {
        keywords
            .iter()
            .filter(|k| self.is_match(k))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(terms: &[&str]) -> KeywordSet {
        KeywordSet::new(terms.iter().map(|t| t.to_string()).collect())
    }

    fn custom(list: &str) -> ModerationVocabulary {
        ModerationVocabulary::custom(ModerationCategory::Violence, list).expect("valid list")
    }

    #[test]
    fn from_name_accepts_every_category_name() {
        for category in ModerationCategory::ALL {
            assert_eq!(ModerationCategory::from_name(category.name()).unwrap(), category);
        }
    }

    #[test]
    fn from_name_is_case_and_dash_tolerant() {
        assert_eq!(
            ModerationCategory::from_name(" Graphic-Content ").unwrap(),
            ModerationCategory::GraphicContent
        );
    }

    #[test]
    fn from_name_rejects_unknown_category() {
        let err = ModerationCategory::from_name("spam").unwrap_err();
        assert!(err.to_string().contains("Unknown moderation category"));
    }

    #[test]
    fn category_labels_match_report_headings() {
        assert_eq!(ModerationCategory::Violence.label(), "Violence Detection");
        assert_eq!(ModerationCategory::ChildSafety.label(), "Child Safety and Exploitation");
    }

    #[test]
    fn custom_list_trims_and_drops_blanks() {
        let vocabulary = custom(" knife , ,gun,  ");
        assert_eq!(vocabulary.phrases(), vec!["knife", "gun"]);
        assert_eq!(vocabulary.label(), "Violence Detection");
    }

    #[test]
    fn custom_list_must_not_be_empty() {
        let result = ModerationVocabulary::custom(ModerationCategory::Violence, " , ");
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn classify_flags_exact_keyword_match() {
        let scorer = ModerationScorer::new(&ModerationVocabulary::Category(
            ModerationCategory::Violence,
        ));
        assert!(scorer.classify(&keywords(&["person", "knife"])));
        assert!(!scorer.classify(&keywords(&["person", "kitchen"])));
    }

    #[test]
    fn classify_does_not_match_substrings() {
        let scorer = ModerationScorer::new(&custom("gun"));
        assert!(!scorer.classify(&keywords(&["gunpowder", "shotgun"])));
    }

    #[test]
    fn classify_is_case_insensitive() {
        let upper = ModerationScorer::new(&custom("KNIFE, Gun"));
        let lower = ModerationScorer::new(&custom("knife, gun"));
        let set = keywords(&["knife"]);
        assert_eq!(upper.classify(&set), lower.classify(&set));
        assert!(upper.classify(&keywords(&["GUN"])));
    }

    #[test]
    fn classify_is_independent_of_vocabulary_order() {
        let forward = ModerationScorer::new(&custom("blood, knife, war"));
        let reverse = ModerationScorer::new(&custom("war, knife, blood"));
        for set in [keywords(&["war"]), keywords(&["peace"]), keywords(&["knife", "x"])] {
            assert_eq!(forward.classify(&set), reverse.classify(&set));
        }
    }

    #[test]
    fn multi_word_phrases_never_match_single_token_keywords() {
        let scorer = ModerationScorer::new(&ModerationVocabulary::Category(
            ModerationCategory::ChildSafety,
        ));
        // "child abuse" is in the vocabulary, but keywords are single tokens.
        assert!(!scorer.classify(&keywords(&["child", "abuse"])));
        assert!(scorer.classify(&keywords(&["child", "playground"])));
    }

    #[test]
    fn empty_keyword_set_is_never_flagged() {
        let scorer = ModerationScorer::new(&ModerationVocabulary::Category(
            ModerationCategory::Violence,
        ));
        assert!(!scorer.classify(&KeywordSet::default()));
    }

    #[test]
    fn matched_keywords_keep_rank_order() {
        let scorer = ModerationScorer::new(&custom("gun, knife"));
        let matched = scorer.matched_keywords(&keywords(&["knife", "table", "gun"]));
        assert_eq!(matched, vec!["knife", "gun"]);
    }
}
