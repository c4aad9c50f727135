use std::cmp::Ordering;

use tracing::debug;

use shared_config::AppConfig;

use crate::models::MedicalRecommendation;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.1;

/// Filters, orders and truncates scored packages.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    max_results: usize,
    min_relevance: f64,
}

impl Default for Ranker {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_relevance: DEFAULT_MIN_RELEVANCE,
        }
    }
}

impl Ranker {
    pub fn new(max_results: usize, min_relevance: f64) -> Self {
        Self { max_results, min_relevance }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.recommendation_max_results, config.recommendation_min_relevance)
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Drops packages at or below the relevance threshold, orders by
    /// descending score then descending urgency priority, keeps the top N.
    pub fn rank(&self, scored: Vec<MedicalRecommendation>) -> Vec<MedicalRecommendation> {
        let total = scored.len();

        let mut ranked: Vec<MedicalRecommendation> = scored.into_iter()
            .filter(|rec| rec.relevance_score > self.min_relevance)
            .collect();

        ranked.sort_by(compare_recommendations);
        ranked.truncate(self.max_results);

        debug!("Ranked {} of {} scored packages", ranked.len(), total);
        ranked
    }
}

fn compare_recommendations(a: &MedicalRecommendation, b: &MedicalRecommendation) -> Ordering {
    b.relevance_score.total_cmp(&a.relevance_score)
        .then_with(|| urgency_priority(&b.urgency_justification).cmp(&urgency_priority(&a.urgency_justification)))
}

/// Severity rank read back from the justification text rather than the
/// urgency enum.
// TODO: compare UrgencyLevel directly once product confirms the tie-break order for equal scores.
pub fn urgency_priority(urgency_text: &str) -> u8 {
    let text = urgency_text.to_lowercase();
    if text.contains("cao") {
        3
    } else if text.contains("trung bình") {
        2
    } else if text.contains("thấp") {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;
    use crate::services::scoring::{JUSTIFICATION_PRESSING, JUSTIFICATION_ROUTINE, JUSTIFICATION_SOON};

    fn rec(id: &str, score: f64, justification: &str) -> MedicalRecommendation {
        MedicalRecommendation {
            package_id: id.to_string(),
            package_name: format!("Package {}", id),
            relevance_score: score,
            clinical_reasoning: String::new(),
            urgency_justification: justification.to_string(),
            specialty_match: false,
            confidence_level: ConfidenceLevel::from_score(score),
            package_specialties: Vec::new(),
            fallback: false,
        }
    }

    fn ids(recs: &[MedicalRecommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.package_id.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let ranker = Ranker::default();
        let scored = (1..=8)
            .map(|i| rec(&i.to_string(), i as f64 * 0.1 + 0.05, JUSTIFICATION_SOON))
            .collect();

        let ranked = ranker.rank(scored);

        assert_eq!(ids(&ranked), vec!["8", "7", "6", "5", "4"]);
        assert!(ranked.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let ranker = Ranker::default();
        let ranked = ranker.rank(vec![
            rec("at", 0.1, JUSTIFICATION_SOON),
            rec("below", 0.05, JUSTIFICATION_SOON),
            rec("above", 0.101, JUSTIFICATION_SOON),
        ]);

        assert_eq!(ids(&ranked), vec!["above"]);
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(Ranker::default().rank(Vec::new()).is_empty());
    }

    #[test]
    fn test_tie_break_uses_justification_text() {
        let ranker = Ranker::default();
        let ranked = ranker.rank(vec![
            rec("routine", 0.5, JUSTIFICATION_ROUTINE),
            rec("pressing", 0.5, JUSTIFICATION_PRESSING),
        ]);

        assert_eq!(ids(&ranked), vec!["pressing", "routine"]);
    }

    #[test]
    fn test_full_ties_keep_catalog_order() {
        let ranker = Ranker::default();
        let ranked = ranker.rank(vec![
            rec("first", 0.3, JUSTIFICATION_SOON),
            rec("second", 0.3, JUSTIFICATION_SOON),
        ]);

        assert_eq!(ids(&ranked), vec!["first", "second"]);
    }

    #[test]
    fn test_urgency_priority_text_mapping() {
        assert_eq!(urgency_priority(JUSTIFICATION_PRESSING), 3);
        assert_eq!(urgency_priority("Mức độ trung bình"), 2);
        assert_eq!(urgency_priority("Mức độ thấp"), 1);
        // neither the medium nor the low justification names a level
        assert_eq!(urgency_priority(JUSTIFICATION_SOON), 0);
        assert_eq!(urgency_priority(JUSTIFICATION_ROUTINE), 0);
    }

    #[test]
    fn test_configured_limits() {
        let ranker = Ranker::new(2, 0.0);
        let ranked = ranker.rank(vec![
            rec("a", 0.01, JUSTIFICATION_SOON),
            rec("b", 0.02, JUSTIFICATION_SOON),
            rec("c", 0.03, JUSTIFICATION_SOON),
        ]);

        assert_eq!(ids(&ranked), vec!["c", "b"]);
    }
}
