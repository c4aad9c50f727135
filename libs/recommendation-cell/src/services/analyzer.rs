// =====================================================================================
// SYMPTOM ANALYZER - CATEGORY MATCHING, RED FLAGS, RELATED SYMPTOMS
// =====================================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::RecommendationError;
use crate::models::{RedFlag, RedFlagSeverity, SymptomAnalysis, SymptomCategory, UrgencyLevel};
use crate::services::knowledge::{KnowledgeBase, CRITICAL_NOTE};

pub const MAX_CONFIDENCE: f64 = 0.95;
pub const MAX_CATEGORY_CONFIDENCE: f64 = 0.9;
pub const RELATED_SYMPTOM_BOOST: f64 = 0.1;
const RELATED_SYMPTOM_BOOST_THRESHOLD: usize = 2;

/// Outcome of the category matcher before red flags and related symptoms are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub category: SymptomCategory,
    pub urgency: UrgencyLevel,
    pub confidence: f64,
    pub possible_conditions: Vec<String>,
    pub specialties: Vec<String>,
    pub critical: bool,
}

impl Default for CategoryMatch {
    fn default() -> Self {
        Self {
            category: SymptomCategory::General,
            urgency: UrgencyLevel::Low,
            confidence: 0.0,
            possible_conditions: Vec::new(),
            specialties: Vec::new(),
            critical: false,
        }
    }
}

pub struct SymptomAnalyzer {
    knowledge: Arc<KnowledgeBase>,
}

impl SymptomAnalyzer {
    pub fn new() -> Result<Self, RecommendationError> {
        Ok(Self::with_knowledge(Arc::new(KnowledgeBase::standard()?)))
    }

    pub fn with_knowledge(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Full analysis of a free-text symptom description. Never fails; blank
    /// input yields the general/low/0.0 default.
    #[instrument(skip(self, symptom_text))]
    pub fn analyze(&self, symptom_text: &str) -> SymptomAnalysis {
        let text = normalize(symptom_text);

        let matched = self.classify(&text);
        let related_symptoms = self.extract_related(&text);
        let detected_flags = self.detect_red_flags(&text);

        let (confidence_score, red_flags) = if matched.critical {
            let mut flags = vec![RedFlag::critical_note(CRITICAL_NOTE)];
            flags.extend(detected_flags);
            (MAX_CONFIDENCE, flags)
        } else {
            let mut confidence = matched.confidence;
            if related_symptoms.len() > RELATED_SYMPTOM_BOOST_THRESHOLD {
                confidence = (confidence + RELATED_SYMPTOM_BOOST).min(MAX_CONFIDENCE);
            }
            (confidence, detected_flags)
        };

        debug!("Symptoms classified as {} ({}), confidence {:.2}, {} red flag(s)",
               matched.category, matched.urgency, confidence_score, red_flags.len());

        SymptomAnalysis {
            primary_category: matched.category,
            urgency_level: matched.urgency,
            confidence_score,
            related_symptoms,
            possible_conditions: matched.possible_conditions,
            recommended_specialties: matched.specialties,
            red_flags,
        }
    }

    /// Pattern-density classification. A critical pattern short-circuits every
    /// other category.
    pub fn classify(&self, symptom_text: &str) -> CategoryMatch {
        let text = normalize(symptom_text);

        if self.knowledge.matches_critical(&text) {
            return CategoryMatch {
                urgency: UrgencyLevel::Critical,
                confidence: MAX_CONFIDENCE,
                critical: true,
                ..CategoryMatch::default()
            };
        }

        let mut best = CategoryMatch::default();
        // Uncapped, so two fully matched categories still tie and the earlier one stays.
        let mut best_density = 0.0;

        for profile in self.knowledge.categories() {
            let density = profile.density(&text);
            if density > best_density {
                best_density = density;
                best = CategoryMatch {
                    category: profile.category,
                    urgency: profile.urgency,
                    confidence: density.min(MAX_CATEGORY_CONFIDENCE),
                    possible_conditions: profile.possible_conditions.clone(),
                    specialties: profile.specialties.clone(),
                    critical: false,
                };
            }
        }

        best
    }

    pub fn detect_red_flags(&self, symptom_text: &str) -> Vec<RedFlag> {
        let text = normalize(symptom_text);

        let emergency = self.knowledge.emergency_flags().iter()
            .filter(|phrase| text.contains(*phrase))
            .map(|phrase| RedFlag::new(RedFlagSeverity::Emergency, phrase));

        let urgent = self.knowledge.urgent_flags().iter()
            .filter(|phrase| text.contains(*phrase))
            .map(|phrase| RedFlag::new(RedFlagSeverity::Urgent, phrase));

        emergency.chain(urgent).collect()
    }

    pub fn extract_related(&self, symptom_text: &str) -> BTreeSet<String> {
        let text = normalize(symptom_text);

        self.knowledge.clusters().iter()
            .flat_map(|cluster| cluster.terms.iter())
            .filter(|term| text.contains(*term))
            .map(|term| term.to_string())
            .collect()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn analyzer() -> SymptomAnalyzer {
        SymptomAnalyzer::new().expect("standard knowledge base compiles")
    }

    #[test]
    fn test_chest_pain_is_cardiovascular() {
        let analysis = analyzer().analyze("đau ngực trái, khó thở, mồ hôi lạnh");

        assert_eq!(analysis.primary_category, SymptomCategory::Cardiovascular);
        assert_eq!(analysis.urgency_level, UrgencyLevel::High);
        assert!(analysis.recommended_specialties.contains(&"tim mạch".to_string()));
        assert!(analysis.possible_conditions.contains(&"Acute coronary syndrome".to_string()));
        assert!((analysis.confidence_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_critical_pattern_short_circuits() {
        let analysis = analyzer().analyze("đau đầu đột ngột dữ dội, nôn mửa, cổ cứng");

        assert_eq!(analysis.urgency_level, UrgencyLevel::Critical);
        assert_eq!(analysis.confidence_score, MAX_CONFIDENCE);
        assert_eq!(analysis.primary_category, SymptomCategory::General);
        assert!(analysis.recommended_specialties.is_empty());
        assert_eq!(analysis.red_flags[0].message, CRITICAL_NOTE);
        // the detector still runs on the critical path
        assert!(analysis.red_flags.iter().any(|f| f.phrase == "đau đầu đột ngột dữ dội"));
    }

    #[test]
    fn test_critical_overrides_other_categories() {
        let analysis = analyzer().analyze("đau răng nhức nhối, sưng lợi, mủ răng và khó thở nặng");
        assert_eq!(analysis.urgency_level, UrgencyLevel::Critical);
        assert_eq!(analysis.confidence_score, 0.95);
    }

    #[test]
    fn test_blank_input_yields_default_analysis() {
        let analysis = analyzer().analyze("   ");
        assert_eq!(analysis, SymptomAnalysis::default());
    }

    #[test]
    fn test_related_symptoms_boost_confidence() {
        let analysis = analyzer().analyze("đau răng, sưng lợi, mủ răng");

        assert_eq!(analysis.primary_category, SymptomCategory::Dental);
        assert_eq!(analysis.urgency_level, UrgencyLevel::Medium);
        assert_eq!(analysis.related_symptoms.len(), 3);
        // density 2/5 plus the related-symptom boost
        assert!((analysis.confidence_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_two_related_symptoms_do_not_boost() {
        let a = analyzer();
        let matched = a.classify("đau ngực trái, khó thở");
        let analysis = a.analyze("đau ngực trái, khó thở");

        assert_eq!(analysis.related_symptoms.len(), 2);
        assert_eq!(analysis.confidence_score, matched.confidence);
    }

    #[test]
    fn test_red_flags_are_independent_of_category() {
        let a = analyzer();
        let analysis = a.analyze("hơi ngứa ngáy, hôm qua có ho ra máu");

        assert_matches!(analysis.red_flags.as_slice(), [flag] if flag.severity == RedFlagSeverity::Urgent);
        assert_eq!(analysis.red_flags[0].message, "CẦN CHÚ Ý: ho ra máu");
    }

    #[test]
    fn test_emergency_flags_precede_urgent_flags() {
        let flags = analyzer().detect_red_flags("ho ra máu và đau ngực nặng");

        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].severity, RedFlagSeverity::Emergency);
        assert_eq!(flags[1].severity, RedFlagSeverity::Urgent);
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        // one respiratory pattern and one endocrine pattern, both 1/5
        let matched = analyzer().classify("ho ra máu, khát nước nhiều");
        assert_eq!(matched.category, SymptomCategory::Respiratory);
    }

    #[test]
    fn test_full_match_tie_keeps_table_order() {
        let matched = analyzer().classify(
            "đau ngực trái, nhịp tim nhanh bất thường, huyết áp cao đột ngột, sưng cổ chân đột ngột, \
             đánh trống ngực; đau nửa đầu, vertigo, mờ mắt, tê nửa mặt, run tay chân, mất cảm giác",
        );

        assert_eq!(matched.category, SymptomCategory::Cardiovascular);
        assert_eq!(matched.confidence, MAX_CATEGORY_CONFIDENCE);
    }

    #[test]
    fn test_higher_density_wins() {
        let matched = analyzer().classify("đau tai dữ dội, nghẹt mũi kéo dài, đau mắt đỏ");
        assert_eq!(matched.category, SymptomCategory::Otolaryngological);
        assert!((matched.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_classification_ignores_case_and_padding() {
        let a = analyzer();
        let lower = a.classify("đau ngực trái");
        let upper = a.classify("   ĐAU NGỰC TRÁI  ");
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_confidence_stays_bounded() {
        let a = analyzer();
        let inputs = [
            "",
            "đau ngực trái, nhịp tim nhanh bất thường, huyết áp cao đột ngột, sưng cổ chân đột ngột, đánh trống ngực, mệt mỏi, khó thở, sưng chân",
            "đau răng nhức nhối, răng lung lay, sưng lợi, mủ răng, viêm nha chu, đau hàm, hôi miệng",
            "khó thở nặng",
            "sốt, ho, mệt mỏi, đau bụng, buồn nôn",
        ];

        for input in inputs {
            let analysis = a.analyze(input);
            assert!(analysis.confidence_score >= 0.0, "input: {}", input);
            assert!(analysis.confidence_score <= MAX_CONFIDENCE, "input: {}", input);
        }
    }
}
