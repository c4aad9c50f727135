// =====================================================================================
// FALLBACK MATCHER - KEYWORD-ONLY RECOMMENDATIONS FOR DEGRADED MODE
// =====================================================================================

use tracing::{info, instrument};

use crate::models::{ConfidenceLevel, MedicalRecommendation, PackageCatalogEntry, UrgencyLevel};
use crate::services::knowledge::package_specialties;
use crate::services::scoring::urgency_justification;

pub const FALLBACK_URGENCY: UrgencyLevel = UrgencyLevel::Medium;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Coarse department keyword lists used when the clinical pipeline is unavailable.
pub const COARSE_CATEGORIES: &[(&str, &[&str])] = &[
    ("răng", &["răng", "nha khoa", "răng miệng", "niềng răng", "trám răng"]),
    ("mắt", &["mắt", "nhãn khoa", "thị lực"]),
    ("tim mạch", &["tim mạch", "tim", "mạch máu", "huyết áp"]),
    ("tiêu hóa", &["tiêu hóa", "dạ dày", "ruột", "đau bụng"]),
    ("thần kinh", &["thần kinh", "não", "đau đầu", "chóng mặt"]),
    ("cơ xương khớp", &["cơ xương khớp", "xương", "khớp", "thoát vị"]),
    ("da liễu", &["da liễu", "mụn", "nám", "ngứa"]),
];

#[derive(Debug, Clone, Copy)]
pub struct FallbackMatcher {
    max_results: usize,
}

impl FallbackMatcher {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// Integer keyword-overlap ranking. Infallible: anything it cannot match
    /// simply drops out of the result.
    #[instrument(skip(self, symptoms, packages), fields(packages = packages.len()))]
    pub fn recommend(&self, symptoms: &str, packages: &[PackageCatalogEntry]) -> Vec<MedicalRecommendation> {
        let symptom_text = symptoms.trim().to_lowercase();

        let triggered: Vec<&(&str, &[&str])> = COARSE_CATEGORIES.iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| symptom_text.contains(k)))
            .collect();

        if triggered.is_empty() {
            info!("Fallback matcher found no coarse category in symptoms");
            return Vec::new();
        }

        let mut scored: Vec<(u32, MedicalRecommendation)> = packages.iter()
            .filter_map(|package| {
                let package_text = format!("{} {}", package.name, package.description).to_lowercase();
                let mut score = 0u32;
                let mut departments = Vec::new();

                for (department, keywords) in &triggered {
                    let hits = keywords.iter().filter(|k| package_text.contains(*k)).count() as u32;
                    if hits > 0 {
                        score += hits;
                        departments.push(*department);
                    }
                }

                (score > 0).then(|| (score, fallback_recommendation(package, score, &departments)))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored.into_iter()
            .take(self.max_results)
            .map(|(_, rec)| rec)
            .collect()
    }
}

fn fallback_recommendation(package: &PackageCatalogEntry, score: u32, departments: &[&str]) -> MedicalRecommendation {
    MedicalRecommendation {
        package_id: package.id.clone(),
        package_name: package.name.clone(),
        relevance_score: score as f64,
        clinical_reasoning: format!("Gợi ý theo từ khóa: {}", departments.join(", ")),
        urgency_justification: urgency_justification(FALLBACK_URGENCY).to_string(),
        specialty_match: false,
        confidence_level: ConfidenceLevel::from_score(FALLBACK_CONFIDENCE),
        package_specialties: package_specialties(&package.name, &package.description),
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::knowledge::fallback_catalog;

    fn matcher() -> FallbackMatcher {
        FallbackMatcher::new(5)
    }

    #[test]
    fn test_fallback_results_are_tagged() {
        let packages = vec![
            PackageCatalogEntry::new("p1", "Khám răng miệng", "Nha khoa tổng quát", 200_000.0),
            PackageCatalogEntry::new("p2", "Khám mắt", "Đo thị lực", 150_000.0),
        ];

        let recs = matcher().recommend("đau răng quá", &packages);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].package_id, "p1");
        assert!(recs[0].fallback);
        assert_eq!(recs[0].confidence_level, ConfidenceLevel::Medium);
        assert_eq!(recs[0].urgency_justification, urgency_justification(UrgencyLevel::Medium));
    }

    #[test]
    fn test_sorted_by_integer_score() {
        let packages = vec![
            PackageCatalogEntry::new("weak", "Khám chuyên khoa", "Có khám tim", 0.0),
            PackageCatalogEntry::new("strong", "Gói tim mạch", "Đo huyết áp, siêu âm tim", 0.0),
        ];

        let recs = matcher().recommend("tim đập nhanh, huyết áp cao", &packages);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].package_id, "strong");
        assert!(recs[0].relevance_score > recs[1].relevance_score);
        assert_eq!(recs[1].relevance_score, 1.0);
    }

    #[test]
    fn test_unmatched_symptoms_yield_empty_list() {
        let recs = matcher().recommend("cảm thấy không khỏe", &fallback_catalog());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_empty_catalog_yields_empty_list() {
        assert!(matcher().recommend("đau răng", &[]).is_empty());
    }

    #[test]
    fn test_builtin_catalog_covers_specialty_symptoms() {
        let recs = matcher().recommend("đau đầu, chóng mặt", &fallback_catalog());

        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.fallback));
        assert_eq!(recs[0].package_id, "fallback-specialty");
    }

    #[test]
    fn test_result_bound_is_respected() {
        let packages: Vec<_> = (0..10)
            .map(|i| PackageCatalogEntry::new(&format!("p{}", i), "Khám mắt", "", 0.0))
            .collect();

        assert_eq!(FallbackMatcher::new(5).recommend("mờ mắt", &packages).len(), 5);
    }
}
