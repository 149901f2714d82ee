//! Skill vocabulary and keyword-based skill extraction

use crate::error::{Result, ResumeAnalyzerError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in skill terms, lowercase, in reporting order
pub const DEFAULT_SKILLS: &[&str] = &[
    "python", "java", "c++", "javascript", "sql", "html", "css",
    "react", "node", "django", "flask", "machine learning",
    "deep learning", "nlp", "communication", "leadership",
    "teamwork", "problem solving", "data analysis", "project management",
    "tensorflow", "pytorch", "keras",
];

/// Fixed, ordered list of lowercase skill terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillVocabulary {
    terms: Vec<String>,
}

impl SkillVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    /// Built-in terms followed by any extra ones
    pub fn with_custom_skills(additional_skills: &[String]) -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied().chain(additional_skills.iter().map(String::as_str)))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied())
    }
}

/// Skills found in one text. Each term appears once, in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet {
    skills: Vec<String>,
}

impl SkillSet {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.skills.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}

/// Finds vocabulary terms occurring as substrings of a text.
///
/// Matching is literal containment on the lowercased text, not word-boundary
/// aware: "javascript" also yields "java".
pub struct SkillExtractor {
    vocabulary: SkillVocabulary,
    matcher: Option<AhoCorasick>,
}

impl SkillExtractor {
    pub fn new(vocabulary: SkillVocabulary) -> Result<Self> {
        let matcher = if vocabulary.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(vocabulary.terms()).map_err(|e| {
                ResumeAnalyzerError::Processing(format!("Failed to build skill matcher: {}", e))
            })?)
        };

        Ok(Self { vocabulary, matcher })
    }

    pub fn with_default_vocabulary() -> Result<Self> {
        Self::new(SkillVocabulary::default())
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn extract(&self, text: &str) -> SkillSet {
        let Some(matcher) = &self.matcher else {
            return SkillSet::default();
        };

        let normalized = text.to_lowercase();
        let mut found = vec![false; self.vocabulary.len()];

        // Overlapping search reports every term, including ones nested in longer terms
        for mat in matcher.find_overlapping_iter(&normalized) {
            found[mat.pattern().as_usize()] = true;
        }

        let skills = self
            .vocabulary
            .terms()
            .iter()
            .zip(found)
            .filter_map(|(term, hit)| hit.then(|| term.clone()))
            .collect();

        SkillSet { skills }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SkillExtractor {
        SkillExtractor::with_default_vocabulary().unwrap()
    }

    #[test]
    fn test_default_vocabulary() {
        let vocab = SkillVocabulary::default();
        assert_eq!(vocab.len(), 23);
        assert_eq!(vocab.terms()[0], "python");
        assert_eq!(vocab.terms()[22], "keras");
        assert!(vocab.contains("machine learning"));
    }

    #[test]
    fn test_custom_skills_normalized_and_deduplicated() {
        let vocab = SkillVocabulary::with_custom_skills(&[
            "  Rust ".to_string(),
            "PYTHON".to_string(),
            "".to_string(),
            "rust".to_string(),
        ]);
        assert_eq!(vocab.len(), 24);
        assert_eq!(vocab.terms().last().map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_extract_case_insensitive() {
        let skills = extractor().extract("Built REST APIs in Python with Flask and PostgreSQL/SQL.");
        assert_eq!(skills.as_slice(), &["python", "sql", "flask"]);
    }

    #[test]
    fn test_extract_multi_word_terms() {
        let skills = extractor().extract("Strong Problem Solving and Machine Learning background");
        assert!(skills.contains("problem solving"));
        assert!(skills.contains("machine learning"));
        assert_eq!(skills.len(), 2);
    }

    #[test]
    fn test_substring_matching_is_literal() {
        let skills = extractor().extract("JavaScript developer");
        assert!(skills.contains("javascript"));
        assert!(skills.contains("java"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let skills = extractor().extract("python python PYTHON");
        assert_eq!(skills.as_slice(), &["python"]);
    }

    #[test]
    fn test_no_vocabulary_terms() {
        let skills = extractor().extract("Experienced barista and florist.");
        assert!(skills.is_empty());

        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_result_is_subset_of_vocabulary() {
        let ex = extractor();
        let texts = [
            "c++ and c# and nodejs, react-native, keras/pytorch",
            "Leadership, teamwork, communication. Data analysis in SQL.",
            "nothing relevant here at all",
        ];
        for text in texts {
            for skill in &ex.extract(text) {
                assert!(ex.vocabulary().contains(skill), "{} not in vocabulary", skill);
            }
        }
    }

    #[test]
    fn test_empty_vocabulary() {
        let ex = SkillExtractor::new(SkillVocabulary::new(Vec::<String>::new())).unwrap();
        assert!(ex.extract("python java").is_empty());
    }
}
