// =====================================================================================
// CLINICAL KNOWLEDGE BASE - PATTERN TABLES, CLUSTERS, RED FLAGS
// =====================================================================================

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::RecommendationError;
use crate::models::{CategorySummary, PackageCatalogEntry, SymptomCategory, UrgencyLevel};

/// Static definition of one category's pattern set.
pub struct CategoryDefinition {
    pub category: SymptomCategory,
    pub urgency: UrgencyLevel,
    pub patterns: &'static [&'static str],
    pub possible_conditions: &'static [&'static str],
    pub specialties: &'static [&'static str],
}

pub const CRITICAL_NOTE: &str = "Cần cấp cứu ngay lập tức";

pub const CRITICAL_PATTERNS: &[&str] = &[
    r"không thể thở|khó thở nặng|ngừng thở",
    r"đau ngực nặng|đau ngực như bị đè|nắn|bóp nghẹt",
    r"mất ý thức|ngất xỉu đột ngột|co giật liên tục",
    r"chảy máu nhiều|chảy máu không cầm được",
    r"đau đầu đột ngột dữ dội|đau đầu như vỡ đầu",
    r"sốt cao trên 40độ|sốt kèm co giật",
    r"vết thương hở sâu|vết thương chảy máu nhiều",
    r"ngộ độc thực phẩm nặng|nôn mửa không dừng",
];

/// Evaluation order is significant: on equal density the earlier entry wins.
pub const CATEGORY_DEFINITIONS: &[CategoryDefinition] = &[
    CategoryDefinition {
        category: SymptomCategory::Cardiovascular,
        urgency: UrgencyLevel::High,
        patterns: &[
            r"đau ngực trái|đau ngực lan ra cánh tay",
            r"nhịp tim nhanh bất thường|nhịp tim chậm dưới 50",
            r"huyết áp cao đột ngột|huyết áp thấp đột ngột",
            r"sưng chân kèm đau ngực|sưng cổ chân đột ngột",
            r"khó thở khi nằm|đánh trống ngực",
        ],
        possible_conditions: &["Acute coronary syndrome", "Heart failure", "Arrhythmia"],
        specialties: &["tim mạch", "cấp cứu"],
    },
    CategoryDefinition {
        category: SymptomCategory::Neurological,
        urgency: UrgencyLevel::High,
        patterns: &[
            r"đau đầu migraine|đau nửa đầu",
            r"chóng mặt quay cuồng|vertigo",
            r"mờ mắt|mất thị lực|mờ một mắt",
            r"tê bì nửa người|tê nửa mặt",
            r"run tay chân|co giật nhẹ",
            r"mất cảm giác|mất sức cơ",
        ],
        possible_conditions: &["Stroke", "Migraine", "Neuropathy", "Multiple sclerosis"],
        specialties: &["thần kinh", "phẫu thuật thần kinh"],
    },
    CategoryDefinition {
        category: SymptomCategory::Respiratory,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"ho ra máu|ho ra đờm lẫn máu",
            r"khó thở khi gắng sức|khó thở khi nằm",
            r"ho kéo dài trên 3 tuần|ho mạn tính",
            r"thở khò khè|tiếng rít khi thở",
            r"đau ngực khi thở sâu|đau ngực khi ho",
        ],
        possible_conditions: &["Pneumonia", "COPD", "Asthma", "Lung cancer"],
        specialties: &["hô hấp", "nội khoa"],
    },
    CategoryDefinition {
        category: SymptomCategory::Gastrointestinal,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"đau bụng dữ dội|đau quặn bụng",
            r"nôn ra máu|nôn ra thức ăn cũ",
            r"tiêu chảy ra máu|phân đen",
            r"vàng da kèm đau bụng|vàng mắt",
            r"không thể nuốt|nuốt nghẹn|ợ ra máu",
            r"táo bón kéo dài|mất cảm giác muốn đi vệ sinh",
        ],
        possible_conditions: &["Acute abdomen", "GI bleeding", "Cholecystitis", "Pancreatitis"],
        specialties: &["tiêu hóa", "phẫu thuật tổng quát"],
    },
    CategoryDefinition {
        category: SymptomCategory::Dental,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"đau răng nhức nhối|đau răng không ngủ được",
            r"răng lung lay|răng gãy vỡ",
            r"sưng lợi|sưng má|sưng hàm",
            r"mủ răng|miệng hôi|hôi miệng nặng",
            r"viêm nha chu| lợi chảy máu khi đánh răng",
        ],
        possible_conditions: &["Dental abscess", "Periodontitis", "Tooth fracture", "Pericoronitis"],
        specialties: &["răng", "phẫu thuật miệng hàm mặt"],
    },
    CategoryDefinition {
        category: SymptomCategory::Dermatological,
        urgency: UrgencyLevel::Low,
        patterns: &[
            r"ngứa toàn thân|ngứa không thể chịu đựng",
            r"ban đỏ lan rộng|mẩn ngứa đỏ",
            r"phồng rộp nước|loét da lan rộng",
            r"thay đổi sắc tố da|u hắc tố",
            r"vết loét không lành|mụn cóc lạ",
        ],
        possible_conditions: &["Contact dermatitis", "Psoriasis", "Eczema", "Skin cancer"],
        specialties: &["da liễu"],
    },
    CategoryDefinition {
        category: SymptomCategory::Ophthalmological,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"mờ mắt đột ngột|mất thị lực nhanh",
            r"thay đổi thị lực|thị lực giảm nhanh",
            r"đau mắt đỏ|đau mắt kèm mờ",
            r"thay đổi đồng tử|mờ đục thủy tinh thể",
            r"thay đổi màu sắc nhìn|ánh sáng lạ",
        ],
        possible_conditions: &["Retinal detachment", "Glaucoma", "Cataract", "Macular degeneration"],
        specialties: &["mắt"],
    },
    CategoryDefinition {
        category: SymptomCategory::Otolaryngological,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"đau tai dữ dội|điếc đột ngột",
            r"chảy máu mũi không cầm được",
            r"nuốt nghẹn|đau họng nặng",
            r"chóng mặt quay cuồng kèm nôn",
            r"nghẹt mũi kéo dài|thay đổi giọng nói",
        ],
        possible_conditions: &["Acute otitis media", "Epistaxis", "Tonsillitis", "Vestibular disorders"],
        specialties: &["tai mũi họng"],
    },
    CategoryDefinition {
        category: SymptomCategory::Musculoskeletal,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"đau khớp|sưng khớp|cứng khớp buổi sáng",
            r"đau lưng|đau thắt lưng|đau cột sống",
            r"thoát vị đĩa đệm|đau lan xuống chân",
            r"gãy xương|bong gân|trật khớp",
            r"đau vai gáy|tê mỏi vai",
        ],
        possible_conditions: &["Osteoarthritis", "Herniated disc", "Rheumatoid arthritis", "Fracture"],
        specialties: &["cơ xương khớp", "chỉnh hình"],
    },
    CategoryDefinition {
        category: SymptomCategory::Endocrine,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"khát nước nhiều|uống nhiều nước",
            r"đi tiểu đêm nhiều|tiểu nhiều về đêm",
            r"sụt cân không rõ nguyên nhân|tăng cân nhanh",
            r"đường huyết cao|tiểu đường",
            r"bướu cổ|run tay kèm hồi hộp",
        ],
        possible_conditions: &["Diabetes mellitus", "Hyperthyroidism", "Hypothyroidism"],
        specialties: &["nội tiết"],
    },
    CategoryDefinition {
        category: SymptomCategory::Urological,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"tiểu buốt|tiểu rắt",
            r"tiểu ra máu|nước tiểu đục",
            r"sỏi thận|đau hông lưng lan xuống bụng dưới",
            r"tiểu khó|bí tiểu",
            r"rối loạn cương dương|đau tinh hoàn",
        ],
        possible_conditions: &["Urinary tract infection", "Kidney stones", "Prostatitis"],
        specialties: &["nam khoa"],
    },
    CategoryDefinition {
        category: SymptomCategory::Gynecological,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"kinh nguyệt không đều|rối loạn kinh nguyệt",
            r"đau bụng kinh dữ dội|đau bụng dưới khi hành kinh",
            r"khí hư bất thường|ra khí hư có mùi",
            r"chảy máu âm đạo bất thường|ra máu giữa kỳ kinh",
            r"chậm có thai|vô sinh",
        ],
        possible_conditions: &["Polycystic ovary syndrome", "Endometriosis", "Vaginitis"],
        specialties: &["sản phụ khoa"],
    },
    CategoryDefinition {
        category: SymptomCategory::Pediatric,
        urgency: UrgencyLevel::Medium,
        patterns: &[
            r"trẻ sốt cao|bé sốt",
            r"trẻ biếng ăn|trẻ chậm lớn",
            r"trẻ quấy khóc|bé quấy khóc",
            r"trẻ ho kéo dài|bé ho",
            r"trẻ tiêu chảy|bé nôn trớ",
        ],
        possible_conditions: &["Viral fever", "Malnutrition", "Bronchiolitis"],
        specialties: &["nhi khoa"],
    },
];

pub const SYMPTOM_CLUSTERS: &[(&str, &[&str])] = &[
    ("cardiac_cluster", &["đau ngực", "khó thở", "mệt mỏi", "sưng chân", "đánh trống ngực"]),
    ("respiratory_cluster", &["ho", "khó thở", "đau ngực khi thở", "sốt", "mệt mỏi"]),
    ("gi_cluster", &["đau bụng", "buồn nôn", "tiêu chảy", "táo bón", "chán ăn"]),
    ("neuro_cluster", &["đau đầu", "chóng mặt", "tê bì", "yếu cơ", "mờ mắt"]),
    ("dental_cluster", &["đau răng", "sưng lợi", "mủ răng", "hôi miệng", "đau hàm"]),
];

pub const EMERGENCY_FLAGS: &[&str] = &[
    "khó thở nặng",
    "đau ngực nặng",
    "mất ý thức",
    "chảy máu nhiều",
    "sốt cao kèm co giật",
    "đau bụng dữ dội kèm nôn ói nhiều",
];

pub const URGENT_FLAGS: &[&str] = &[
    "đau đầu đột ngột dữ dội",
    "mờ mắt đột ngột",
    "yếu nửa người",
    "ho ra máu",
    "tiêu chảy ra máu",
    "vàng da nhanh",
];

/// Name markers of general/basic checkup packages.
pub const GENERAL_PACKAGE_MARKERS: &[&str] = &["tổng quát", "cơ bản"];

pub const PACKAGE_SPECIALTY_KEYWORDS: &[(&str, &[&str])] = &[
    ("tim mạch", &["tim", "mạch", "trái tim", "tim mạch", "cardio", "cardiovascular"]),
    ("răng", &["răng", "hàm", "răng miệng", "dental", "nha khoa"]),
    ("mắt", &["mắt", "thị lực", "nhãn khoa", "ophthalmo", "ophthalmology"]),
    ("da liễu", &["da", "liễu", "da liễu", "dermat", "dermatology"]),
    ("thần kinh", &["thần kinh", "não", "thần kinh học", "neuro", "neurology"]),
    ("tiêu hóa", &["tiêu hóa", "dạ dày", "ruột", "gan", "gastro", "gastroenterology"]),
    ("hô hấp", &["phổi", "hô hấp", "phế quản", "respiratory", "pulmonology"]),
    ("nội tiết", &["nội tiết", "hormone", "đái tháo đường", "endocrine"]),
    ("tai mũi họng", &["tai", "mũi", "họng", "tai mũi họng", "ent", "otorhinolaryngology"]),
    ("sản phụ khoa", &["phụ khoa", "sản phụ khoa", "bầu bí", "gynecology", "obstetrics"]),
    ("nam khoa", &["nam khoa", "tiết niệu", "urology", "andrology"]),
    ("cơ xương khớp", &["cơ xương khớp", "chỉnh hình", "orthopedics"]),
    ("nhi khoa", &["nhi", "trẻ em", "pediatrics"]),
    ("tổng quát", &["tổng quát", "cơ bản", "general", "internal medicine"]),
];

/// Package keywords consulted by the relevance scorer for a primary category.
pub fn category_keywords(category: SymptomCategory) -> &'static [&'static str] {
    match category {
        SymptomCategory::Cardiovascular => &["tim mạch", "tim", "mạch", "trái tim", "huyết áp", "nhịp tim", "đánh trống ngực"],
        SymptomCategory::Respiratory => &["phổi", "hô hấp", "ho", "khó thở", "đờm", "phế quản", "hen suyễn"],
        SymptomCategory::Gastrointestinal => &["tiêu hóa", "dạ dày", "ruột", "đau bụng", "tiêu chảy", "táo bón", "ợ nóng", "nôn"],
        SymptomCategory::Neurological => &["thần kinh", "não", "đau đầu", "migraine", "chóng mặt", "co giật", "mất cảm giác", "yếu cơ"],
        SymptomCategory::Musculoskeletal => &["cơ xương khớp", "gãy xương", "thoát vị", "đau khớp", "đau lưng", "chỉnh hình"],
        SymptomCategory::Dermatological => &["da liễu", "da", "mụn", "ngứa", "eczema", "viêm da", "nám"],
        SymptomCategory::Ophthalmological => &["mắt", "thị lực", "đau mắt", "mờ mắt", "đỏ mắt", "nhãn khoa"],
        SymptomCategory::Otolaryngological => &["tai mũi họng", "tai", "mũi", "họng", "điếc", "nghẹt mũi", "đau họng"],
        SymptomCategory::Dental => &["răng", "hàm", "nha khoa", "đau răng", "sưng lợi", "mủ răng"],
        SymptomCategory::Endocrine => &["nội tiết", "tiểu đường", "hormone", "khát nước", "sụt cân", "mệt mỏi"],
        SymptomCategory::Urological => &["tiết niệu", "thận", "bàng quang", "tiểu khó", "tiểu nhiều", "nam khoa"],
        SymptomCategory::Gynecological => &["phụ khoa", "sản phụ khoa", "kinh nguyệt", "bầu bí", "vô sinh"],
        SymptomCategory::Pediatric => &["nhi khoa", "trẻ em", "trẻ nhỏ", "tiêm chủng", "phát triển"],
        SymptomCategory::General => &["tổng quát", "cơ bản", "định kỳ", "kiểm tra sức khỏe", "thường xuyên"],
    }
}

/// Standard packages offered when the live catalog cannot be reached.
pub fn fallback_catalog() -> Vec<PackageCatalogEntry> {
    vec![
        PackageCatalogEntry::new("fallback-general", "Khám tổng quát cơ bản", "Khám tổng thể cơ bản", 300_000.0),
        PackageCatalogEntry::new("fallback-periodic", "Khám sức khỏe định kỳ", "Khám sức khỏe định kỳ hàng năm", 500_000.0),
        PackageCatalogEntry::new(
            "fallback-specialty",
            "Khám chuyên khoa",
            "Khám chuyên khoa theo triệu chứng: mắt, răng, tai mũi họng, tim mạch, tiêu hóa, thần kinh, cơ xương khớp, da liễu",
            0.0,
        ),
        PackageCatalogEntry::new("fallback-pediatric", "Gói khám cho trẻ em", "Khám tổng thể cho trẻ em", 250_000.0),
        PackageCatalogEntry::new("fallback-cancer-screening", "Gói tầm soát ung thư", "Tầm soát các loại ung thư phổ biến", 0.0),
    ]
}

// ==============================================================================
// COMPILED KNOWLEDGE BASE
// ==============================================================================

pub struct CategoryProfile {
    pub category: SymptomCategory,
    pub urgency: UrgencyLevel,
    pub patterns: Vec<Regex>,
    pub possible_conditions: Vec<String>,
    pub specialties: Vec<String>,
}

impl CategoryProfile {
    /// Fraction of this category's patterns found in `text`.
    pub fn density(&self, text: &str) -> f64 {
        if self.patterns.is_empty() {
            return 0.0;
        }
        let matched = self.patterns.iter().filter(|p| p.is_match(text)).count();
        matched as f64 / self.patterns.len() as f64
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            category: self.category,
            urgency: self.urgency,
            pattern_count: self.patterns.len(),
            possible_conditions: self.possible_conditions.clone(),
            specialties: self.specialties.clone(),
        }
    }
}

pub struct SymptomCluster {
    pub name: &'static str,
    pub terms: &'static [&'static str],
}

/// Read-only tables shared by every analysis. Built once per service.
pub struct KnowledgeBase {
    critical_patterns: Vec<Regex>,
    categories: Vec<CategoryProfile>,
    clusters: Vec<SymptomCluster>,
    emergency_flags: &'static [&'static str],
    urgent_flags: &'static [&'static str],
}

impl KnowledgeBase {
    pub fn standard() -> Result<Self, RecommendationError> {
        let critical_patterns = compile_patterns(CRITICAL_PATTERNS)?;

        let categories = CATEGORY_DEFINITIONS.iter()
            .map(|def| {
                Ok(CategoryProfile {
                    category: def.category,
                    urgency: def.urgency,
                    patterns: compile_patterns(def.patterns)?,
                    possible_conditions: def.possible_conditions.iter().map(|s| s.to_string()).collect(),
                    specialties: def.specialties.iter().map(|s| s.to_string()).collect(),
                })
            })
            .collect::<Result<Vec<_>, RecommendationError>>()?;

        let clusters = SYMPTOM_CLUSTERS.iter()
            .map(|&(name, terms)| SymptomCluster { name, terms })
            .collect();

        debug!("Knowledge base compiled: {} categories, {} critical patterns",
               categories.len(), critical_patterns.len());

        Ok(Self {
            critical_patterns,
            categories,
            clusters,
            emergency_flags: EMERGENCY_FLAGS,
            urgent_flags: URGENT_FLAGS,
        })
    }

    pub fn matches_critical(&self, text: &str) -> bool {
        self.critical_patterns.iter().any(|p| p.is_match(text))
    }

    pub fn categories(&self) -> &[CategoryProfile] {
        &self.categories
    }

    pub fn profile(&self, category: SymptomCategory) -> Option<&CategoryProfile> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn clusters(&self) -> &[SymptomCluster] {
        &self.clusters
    }

    pub fn emergency_flags(&self) -> &[&'static str] {
        self.emergency_flags
    }

    pub fn urgent_flags(&self) -> &[&'static str] {
        self.urgent_flags
    }
}

fn compile_patterns(patterns: &[&str]) -> Result<Vec<Regex>, RecommendationError> {
    patterns.iter()
        .map(|p| RegexBuilder::new(p).case_insensitive(true).build().map_err(RecommendationError::from))
        .collect()
}

/// Department tags recognised in a package's own text.
pub fn package_specialties(name: &str, description: &str) -> Vec<String> {
    let text = format!("{} {}", name, description).to_lowercase();
    PACKAGE_SPECIALTY_KEYWORDS.iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(specialty, _)| specialty.to_string())
        .collect()
}

pub fn is_general_package(package_name: &str) -> bool {
    let name = package_name.to_lowercase();
    GENERAL_PACKAGE_MARKERS.iter().any(|m| name.contains(m))
}
