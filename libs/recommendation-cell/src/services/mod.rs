pub mod knowledge;
pub mod analyzer;
pub mod scoring;
pub mod ranking;
pub mod fallback;
pub mod catalog;
pub mod recommendation;

pub use knowledge::KnowledgeBase;
pub use analyzer::SymptomAnalyzer;
pub use scoring::RelevanceScorer;
pub use ranking::Ranker;
pub use fallback::FallbackMatcher;
pub use catalog::{ClinicApiCatalog, PackageCatalog, StaticCatalog};
pub use recommendation::RecommendationService;
