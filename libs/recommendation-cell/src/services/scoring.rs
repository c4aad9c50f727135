// =====================================================================================
// RELEVANCE SCORER - PACKAGE VS. SYMPTOM ANALYSIS
// =====================================================================================

use tracing::debug;

use crate::models::{
    ConfidenceLevel, MedicalRecommendation, PackageCatalogEntry, SymptomAnalysis, UrgencyLevel,
};
use crate::services::knowledge::{category_keywords, is_general_package, package_specialties};

pub const SPECIALTY_MATCH_BONUS: f64 = 0.4;
pub const URGENT_GENERAL_BONUS: f64 = 0.3;
pub const URGENT_SUPPLEMENT_BONUS: f64 = 0.05;
pub const ROUTINE_GENERAL_BONUS: f64 = 0.15;
pub const KEYWORD_BONUS: f64 = 0.2;
const REASONING_KEYWORD_LIMIT: usize = 3;

pub const REASON_SPECIALTY: &str = "Chuyên khoa phù hợp với triệu chứng";
pub const REASON_URGENT_GENERAL: &str = "Khám tổng quát cấp thiết để đánh giá triệu chứng khẩn cấp";
pub const REASON_URGENT_SUPPLEMENT: &str = "Có thể bổ sung để kiểm tra toàn diện";
pub const REASON_ROUTINE_GENERAL: &str = "Khám tổng quát để đánh giá ban đầu";
pub const REASON_DEFAULT: &str = "Dựa trên phân tích triệu chứng";

pub const JUSTIFICATION_PRESSING: &str = "Khuyến nghị khám sớm do mức độ khẩn cấp cao";
pub const JUSTIFICATION_SOON: &str = "Nên khám trong thời gian sớm";
pub const JUSTIFICATION_ROUTINE: &str = "Có thể sắp xếp theo lịch phù hợp";

pub fn urgency_justification(urgency: UrgencyLevel) -> &'static str {
    match urgency {
        UrgencyLevel::High | UrgencyLevel::Critical => JUSTIFICATION_PRESSING,
        UrgencyLevel::Medium => JUSTIFICATION_SOON,
        UrgencyLevel::Low => JUSTIFICATION_ROUTINE,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Additive relevance of one package, scaled by the analysis confidence.
    pub fn score(&self, package: &PackageCatalogEntry, analysis: &SymptomAnalysis) -> MedicalRecommendation {
        let package_name = package.name.to_lowercase();
        let package_desc = package.description.to_lowercase();
        let mentions = |term: &str| package_name.contains(term) || package_desc.contains(term);

        let mut relevance_score = 0.0;
        let mut reasoning: Vec<String> = Vec::new();

        let specialty_match = analysis.recommended_specialties.iter()
            .any(|specialty| mentions(&specialty.to_lowercase()));

        if specialty_match {
            relevance_score += SPECIALTY_MATCH_BONUS;
            reasoning.push(REASON_SPECIALTY.to_string());
        } else if analysis.urgency_level.is_pressing() {
            if is_general_package(&package_name) {
                relevance_score += URGENT_GENERAL_BONUS;
                reasoning.push(REASON_URGENT_GENERAL.to_string());
            } else {
                relevance_score += URGENT_SUPPLEMENT_BONUS;
                reasoning.push(REASON_URGENT_SUPPLEMENT.to_string());
            }
        } else if is_general_package(&package_name) {
            relevance_score += ROUTINE_GENERAL_BONUS;
            reasoning.push(REASON_ROUTINE_GENERAL.to_string());
        }

        // Uncapped: every matched keyword adds the full bonus.
        let keyword_matches: Vec<&str> = category_keywords(analysis.primary_category).iter()
            .copied()
            .filter(|keyword| mentions(keyword))
            .collect();
        relevance_score += KEYWORD_BONUS * keyword_matches.len() as f64;

        if !keyword_matches.is_empty() {
            let shown: Vec<&str> = keyword_matches.iter().take(REASONING_KEYWORD_LIMIT).copied().collect();
            reasoning.push(format!("Liên quan đến: {}", shown.join(", ")));
        }

        relevance_score *= analysis.confidence_score;

        let clinical_reasoning = if reasoning.is_empty() {
            REASON_DEFAULT.to_string()
        } else {
            reasoning.join("; ")
        };

        debug!("Package {} scored {:.3} (specialty match: {}, keywords: {})",
               package.id, relevance_score, specialty_match, keyword_matches.len());

        MedicalRecommendation {
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            relevance_score: round_score(relevance_score),
            clinical_reasoning,
            urgency_justification: urgency_justification(analysis.urgency_level).to_string(),
            specialty_match,
            confidence_level: ConfidenceLevel::from_score(relevance_score),
            package_specialties: package_specialties(&package.name, &package.description),
            fallback: false,
        }
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
