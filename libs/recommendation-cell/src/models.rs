use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ==============================================================================
// CLASSIFICATION TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymptomCategory {
    Cardiovascular,
    Respiratory,
    Gastrointestinal,
    Neurological,
    Musculoskeletal,
    Dermatological,
    Ophthalmological,
    Otolaryngological,
    Dental,
    Endocrine,
    Urological,
    Gynecological,
    Pediatric,
    General,
}

impl SymptomCategory {
    pub const ALL: [SymptomCategory; 14] = [
        SymptomCategory::Cardiovascular,
        SymptomCategory::Respiratory,
        SymptomCategory::Gastrointestinal,
        SymptomCategory::Neurological,
        SymptomCategory::Musculoskeletal,
        SymptomCategory::Dermatological,
        SymptomCategory::Ophthalmological,
        SymptomCategory::Otolaryngological,
        SymptomCategory::Dental,
        SymptomCategory::Endocrine,
        SymptomCategory::Urological,
        SymptomCategory::Gynecological,
        SymptomCategory::Pediatric,
        SymptomCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymptomCategory::Cardiovascular => "cardiovascular",
            SymptomCategory::Respiratory => "respiratory",
            SymptomCategory::Gastrointestinal => "gastrointestinal",
            SymptomCategory::Neurological => "neurological",
            SymptomCategory::Musculoskeletal => "musculoskeletal",
            SymptomCategory::Dermatological => "dermatological",
            SymptomCategory::Ophthalmological => "ophthalmological",
            SymptomCategory::Otolaryngological => "otolaryngological",
            SymptomCategory::Dental => "dental",
            SymptomCategory::Endocrine => "endocrine",
            SymptomCategory::Urological => "urological",
            SymptomCategory::Gynecological => "gynecological",
            SymptomCategory::Pediatric => "pediatric",
            SymptomCategory::General => "general",
        }
    }
}

impl fmt::Display for SymptomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered severity: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn is_pressing(&self) -> bool {
        matches!(self, UrgencyLevel::High | UrgencyLevel::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
            UrgencyLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedFlagSeverity {
    Emergency,
    Urgent,
}

impl RedFlagSeverity {
    pub fn tag(&self) -> &'static str {
        match self {
            RedFlagSeverity::Emergency => "KHẨN CẤP",
            RedFlagSeverity::Urgent => "CẦN CHÚ Ý",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub severity: RedFlagSeverity,
    pub phrase: String,
    pub message: String,
}

impl RedFlag {
    pub fn new(severity: RedFlagSeverity, phrase: &str) -> Self {
        Self {
            severity,
            phrase: phrase.to_string(),
            message: format!("{}: {}", severity.tag(), phrase),
        }
    }

    /// Untagged note raised by a critical-pattern match.
    pub fn critical_note(message: &str) -> Self {
        Self {
            severity: RedFlagSeverity::Emergency,
            phrase: String::new(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub primary_category: SymptomCategory,
    pub urgency_level: UrgencyLevel,
    pub confidence_score: f64, // 0.0 to 0.95
    pub related_symptoms: BTreeSet<String>,
    pub possible_conditions: Vec<String>,
    pub recommended_specialties: Vec<String>,
    pub red_flags: Vec<RedFlag>,
}

impl Default for SymptomAnalysis {
    fn default() -> Self {
        Self {
            primary_category: SymptomCategory::General,
            urgency_level: UrgencyLevel::Low,
            confidence_score: 0.0,
            related_symptoms: BTreeSet::new(),
            possible_conditions: Vec::new(),
            recommended_specialties: Vec::new(),
            red_flags: Vec::new(),
        }
    }
}

impl SymptomAnalysis {
    pub fn has_red_flags(&self) -> bool {
        !self.red_flags.is_empty()
    }
}

// ==============================================================================
// CATALOG & RECOMMENDATION TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            ConfidenceLevel::High
        } else if score > 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// A service package as published by the clinic catalog. Deserialization
/// never rejects an entry: malformed fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct PackageCatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl PackageCatalogEntry {
    pub fn new(id: &str, name: &str, description: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

impl From<Value> for PackageCatalogEntry {
    fn from(value: Value) -> Self {
        // `id` wins whenever the key is present, even alongside `medicalPackageId`.
        let id = match value.get("id") {
            Some(id) => lenient_id(id),
            None => value.get("medicalPackageId").map(lenient_id).unwrap_or_default(),
        };

        Self {
            id,
            name: lenient_text(value.get("name")),
            description: lenient_text(value.get("description")),
            price: lenient_price(value.get("price")),
        }
    }
}

// Catalog ids arrive as strings or numbers depending on the upstream service.
fn lenient_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn lenient_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn lenient_price(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()).unwrap_or_default(),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecommendation {
    pub package_id: String,
    pub package_name: String,
    pub relevance_score: f64,
    pub clinical_reasoning: String,
    pub urgency_justification: String,
    pub specialty_match: bool,
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub package_specialties: Vec<String>,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub symptoms: String,
    pub analysis: Option<SymptomAnalysis>,
    pub recommendations: Vec<MedicalRecommendation>,
    pub urgency_level: UrgencyLevel,
    pub confidence_score: f64,
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResponse {
    /// An empty list means "no confident match", not an error.
    pub fn has_recommendations(&self) -> bool {
        !self.recommendations.is_empty()
    }
}

// ==============================================================================
// REQUEST DTOs
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatePackagesRequest {
    pub symptoms: String,
    #[serde(default)]
    pub packages: Vec<PackageCatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: SymptomCategory,
    pub urgency: UrgencyLevel,
    pub pattern_count: usize,
    pub possible_conditions: Vec<String>,
    pub specialties: Vec<String>,
}
