use proptest::prelude::*;
use std::collections::HashMap;

use resume_analyzer::error::{Result, ResumeAnalyzerError};
use resume_analyzer::processing::embeddings::Embedder;
use resume_analyzer::processing::matcher::{SimilarityMatcher, SimilarityThreshold};
use resume_analyzer::processing::skills::{SkillExtractor, SkillVocabulary, DEFAULT_SKILLS};

/// Fixed vector per vocabulary term
#[derive(Debug)]
struct RandomEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl Embedder for RandomEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| ResumeAnalyzerError::Embedding(text.to_string()))
    }

    fn model_name(&self) -> &str {
        "random"
    }
}

fn arb_embedder() -> impl Strategy<Value = RandomEmbedder> {
    prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 8), DEFAULT_SKILLS.len()).prop_map(|vectors| {
        RandomEmbedder {
            vectors: DEFAULT_SKILLS.iter().map(|s| s.to_string()).zip(vectors).collect(),
        }
    })
}

fn arb_skills() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(DEFAULT_SKILLS.to_vec(), 0..=DEFAULT_SKILLS.len())
        .prop_map(|skills| skills.into_iter().map(String::from).collect())
}

proptest! {
    // =========================================================================
    // Matching
    // =========================================================================

    #[test]
    fn test_match_partitions_job_skills(
        embedder in arb_embedder(),
        resume in arb_skills(),
        job in arb_skills(),
        percent in 50u8..=90,
    ) {
        let matcher = SimilarityMatcher::new(&embedder, SimilarityThreshold::from_percent(percent).unwrap());
        let result = matcher.match_skills(&resume, &job).unwrap();

        prop_assert_eq!(result.total(), job.len());
        for skill in &job {
            prop_assert!(result.matched.contains(skill) ^ result.missing.contains(skill));
        }
        for skill in result.matched.iter().chain(&result.missing) {
            prop_assert!(job.contains(skill));
        }

        let percentage = result.match_percentage();
        prop_assert!((0.0..=100.0).contains(&percentage));
        if job.is_empty() {
            prop_assert_eq!(percentage, 0.0);
        }
    }

    #[test]
    fn test_lower_threshold_never_matches_fewer(
        embedder in arb_embedder(),
        resume in arb_skills(),
        job in arb_skills(),
        low in 50u8..=90,
        high in 50u8..=90,
    ) {
        let (low, high) = (low.min(high), low.max(high));
        let loose = SimilarityMatcher::new(&embedder, SimilarityThreshold::from_percent(low).unwrap())
            .match_skills(&resume, &job)
            .unwrap();
        let strict = SimilarityMatcher::new(&embedder, SimilarityThreshold::from_percent(high).unwrap())
            .match_skills(&resume, &job)
            .unwrap();

        for skill in &strict.matched {
            prop_assert!(loose.matched.contains(skill), "{} lost at {}%", skill, low);
        }
        prop_assert!(loose.match_percentage() >= strict.match_percentage());
    }

    #[test]
    fn test_empty_resume_misses_everything(embedder in arb_embedder(), job in arb_skills()) {
        let matcher = SimilarityMatcher::new(&embedder, SimilarityThreshold::from_percent(50).unwrap());
        let result = matcher.match_skills(&[], &job).unwrap();

        prop_assert!(result.matched.is_empty());
        prop_assert_eq!(result.missing, job);
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    #[test]
    fn test_extracted_skills_come_from_vocabulary(text in ".*") {
        let extractor = SkillExtractor::with_default_vocabulary().unwrap();
        let skills = extractor.extract(&text);
        let lowered = text.to_lowercase();

        for skill in &skills {
            prop_assert!(extractor.vocabulary().contains(skill));
        }
        // Exactly the terms contained in the text, once each, in vocabulary order
        let expected: Vec<&String> = extractor
            .vocabulary()
            .terms()
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .collect();
        prop_assert_eq!(skills.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_text_without_terms_yields_nothing(text in ".*") {
        let lowered = text.to_lowercase();
        prop_assume!(DEFAULT_SKILLS.iter().all(|term| !lowered.contains(term)));

        let extractor = SkillExtractor::with_default_vocabulary().unwrap();
        prop_assert!(extractor.extract(&text).is_empty());
    }

    #[test]
    fn test_custom_vocabulary_bounds_extraction(
        extra in prop::collection::vec("[a-z]{2,8}", 0..5),
        text in "[a-z +]{0,80}",
    ) {
        let vocabulary = SkillVocabulary::with_custom_skills(&extra);
        let extractor = SkillExtractor::new(vocabulary.clone()).unwrap();

        for skill in &extractor.extract(&text) {
            prop_assert!(vocabulary.contains(skill));
            prop_assert!(text.contains(skill.as_str()));
        }
    }
}
