use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location code meaning "any region"; it is never carried into a route.
pub const UNSCOPED_LOCATION: &str = "all";

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed reading lexicon file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lexicon json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate location variant `{0}`")]
    DuplicateLocation(String),

    #[error("empty keyword in {0}")]
    EmptyKeyword(String),

    #[error("sector entry with an empty id")]
    EmptySectorId,

    #[error("location `{0}` has an empty code")]
    EmptyLocationCode(String),

    #[error("phrase override `{phrase}` names unknown sector `{sector}`")]
    UnknownOverrideSector { phrase: String, sector: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorKeywords {
    pub id: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseOverride {
    pub phrase: String,
    pub sector: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub code: String,
}

/// On-disk shape of a lexicon. Order inside every list is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconSource {
    pub market_keywords: Vec<String>,
    pub data_keywords: Vec<String>,
    pub sectors: Vec<SectorKeywords>,
    pub ai_starters: Vec<String>,
    #[serde(default)]
    pub phrase_overrides: Vec<PhraseOverride>,
    pub locations: Vec<LocationEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LexiconSummary {
    pub market_keywords: usize,
    pub data_keywords: usize,
    pub ai_starters: usize,
    pub phrase_overrides: usize,
    pub sectors: Vec<String>,
    pub location_variants: usize,
    pub location_codes: Vec<String>,
}

/// Validated, case-folded keyword tables. Immutable once built.
#[derive(Debug, Clone)]
pub struct Lexicon {
    market_keywords: Vec<String>,
    data_keywords: Vec<String>,
    sectors: Vec<SectorKeywords>,
    ai_starters: Vec<String>,
    phrase_overrides: Vec<PhraseOverride>,
    locations: IndexMap<String, String>,
}

static BUILTIN: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    Arc::new(Lexicon::from_source(builtin_source()).expect("built-in lexicon is valid"))
});

impl Lexicon {
    pub fn builtin() -> Arc<Self> {
        BUILTIN.clone()
    }

    pub fn from_source(source: LexiconSource) -> Result<Self, LexiconError> {
        let market_keywords = fold_keywords(source.market_keywords, "market_keywords")?;
        let data_keywords = fold_keywords(source.data_keywords, "data_keywords")?;
        let ai_starters = fold_keywords(source.ai_starters, "ai_starters")?;

        let mut sectors = Vec::with_capacity(source.sectors.len());
        for sector in source.sectors {
            let id = sector.id.trim().to_lowercase();
            if id.is_empty() {
                return Err(LexiconError::EmptySectorId);
            }
            let keywords = fold_keywords(sector.keywords, &format!("sector `{id}`"))?;
            sectors.push(SectorKeywords { id, keywords });
        }

        let mut phrase_overrides = Vec::with_capacity(source.phrase_overrides.len());
        for entry in source.phrase_overrides {
            let phrase = fold(&entry.phrase);
            if phrase.is_empty() {
                return Err(LexiconError::EmptyKeyword("phrase_overrides".to_string()));
            }
            let sector = entry.sector.trim().to_lowercase();
            if !sectors.iter().any(|known| known.id == sector) {
                return Err(LexiconError::UnknownOverrideSector { phrase, sector });
            }
            phrase_overrides.push(PhraseOverride { phrase, sector });
        }

        let mut locations = IndexMap::with_capacity(source.locations.len());
        for entry in source.locations {
            let name = fold(&entry.name);
            if name.is_empty() {
                return Err(LexiconError::EmptyKeyword("locations".to_string()));
            }
            let code = entry.code.trim().to_lowercase();
            if code.is_empty() {
                return Err(LexiconError::EmptyLocationCode(name));
            }
            if locations.insert(name.clone(), code).is_some() {
                return Err(LexiconError::DuplicateLocation(name));
            }
        }

        Ok(Self {
            market_keywords,
            data_keywords,
            sectors,
            ai_starters,
            phrase_overrides,
            locations,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LexiconError> {
        let source = serde_json::from_str::<LexiconSource>(raw)?;
        Self::from_source(source)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn market_keywords(&self) -> &[String] {
        &self.market_keywords
    }

    pub fn data_keywords(&self) -> &[String] {
        &self.data_keywords
    }

    pub fn sectors(&self) -> &[SectorKeywords] {
        &self.sectors
    }

    pub fn ai_starters(&self) -> &[String] {
        &self.ai_starters
    }

    pub fn phrase_overrides(&self) -> &[PhraseOverride] {
        &self.phrase_overrides
    }

    pub fn location_code(&self, name: &str) -> Option<&str> {
        self.locations.get(name).map(String::as_str)
    }

    /// Location variants in definition order.
    pub fn locations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locations
            .iter()
            .map(|(name, code)| (name.as_str(), code.as_str()))
    }

    pub fn to_source(&self) -> LexiconSource {
        LexiconSource {
            market_keywords: self.market_keywords.clone(),
            data_keywords: self.data_keywords.clone(),
            sectors: self.sectors.clone(),
            ai_starters: self.ai_starters.clone(),
            phrase_overrides: self.phrase_overrides.clone(),
            locations: self
                .locations
                .iter()
                .map(|(name, code)| LocationEntry {
                    name: name.clone(),
                    code: code.clone(),
                })
                .collect(),
        }
    }

    pub fn summary(&self) -> LexiconSummary {
        let mut location_codes = Vec::<String>::new();
        for code in self.locations.values() {
            if !location_codes.contains(code) {
                location_codes.push(code.clone());
            }
        }

        LexiconSummary {
            market_keywords: self.market_keywords.len(),
            data_keywords: self.data_keywords.len(),
            ai_starters: self.ai_starters.len(),
            phrase_overrides: self.phrase_overrides.len(),
            sectors: self.sectors.iter().map(|sector| sector.id.clone()).collect(),
            location_variants: self.locations.len(),
            location_codes,
        }
    }
}

fn fold(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn fold_keywords(values: Vec<String>, table: &str) -> Result<Vec<String>, LexiconError> {
    values
        .iter()
        .map(|value| {
            let folded = fold(value);
            if folded.is_empty() {
                Err(LexiconError::EmptyKeyword(table.to_string()))
            } else {
                Ok(folded)
            }
        })
        .collect()
}

const MARKET_KEYWORDS: &[&str] = &[
    "buy",
    "sell",
    "for sale",
    "price",
    "cheap",
    "used",
    "second hand",
    "second-hand",
    "iphone",
    "smartphone",
    "samsung",
    "laptop",
    "marketplace",
    "shop",
    "acheter",
    "achat",
    "vendre",
    "à vendre",
    "prix",
    "occasion",
    "pas cher",
    "boutique",
    "promo",
    "شراء",
    "اشتري",
    "بيع",
    "للبيع",
    "سعر",
    "أسعار",
    "مستعمل",
    "رخيص",
];

const DATA_KEYWORDS: &[&str] = &[
    "statistic",
    "statistique",
    "data",
    "données",
    "donnees",
    "indicator",
    "indicateur",
    "population",
    "census",
    "recensement",
    "gdp",
    "pib",
    "unemployment",
    "chômage",
    "chomage",
    "inflation",
    "growth",
    "croissance",
    "trend",
    "tendance",
    "report",
    "rapport",
    "إحصاء",
    "إحصائيات",
    "بيانات",
    "مؤشر",
    "سكان",
    "بطالة",
    "تضخم",
];

/// Sector ids are the slugs the data backend files indicators under.
const SECTORS: &[(&str, &[&str])] = &[
    (
        "agriculture",
        &[
            "agricultur",
            "agricole",
            "farm",
            "ferme",
            "greenhouse",
            "serre",
            "crop",
            "wheat",
            "blé",
            "olive",
            "date palm",
            "dattes",
            "livestock",
            "élevage",
            "cattle",
            "poultry",
            "volaille",
            "فلاحة",
            "زراعة",
            "بيوت بلاستيكية",
            "قمح",
            "تمور",
            "مواشي",
        ],
    ),
    (
        "energy",
        &[
            "energy",
            "énergie",
            "energie",
            "solar",
            "solaire",
            "electricity",
            "électricité",
            "electricite",
            "oil",
            "pétrole",
            "petrole",
            "gas",
            "gaz",
            "hydrocarbon",
            "hydrocarbure",
            "renewable",
            "renouvelable",
            "طاقة",
            "شمسية",
            "كهرباء",
            "نفط",
            "بترول",
            "غاز",
        ],
    ),
    (
        "manufacturing",
        &[
            "manufactur",
            "factory",
            "usine",
            "industr",
            "textile",
            "cement",
            "ciment",
            "steel",
            "acier",
            "plastic",
            "plastique",
            "صناعة",
            "مصنع",
            "مصانع",
            "إسمنت",
        ],
    ),
    (
        "services",
        &[
            "bank",
            "banque",
            "insurance",
            "assurance",
            "financ",
            "investment",
            "investissement",
            "credit",
            "crédit",
            "loan",
            "prêt",
            "fintech",
            "bakery",
            "boulangerie",
            "restaurant",
            "cafe",
            "café",
            "cleaning",
            "nettoyage",
            "خدمات",
            "بنك",
            "مصرف",
            "تأمين",
            "تمويل",
            "استثمار",
            "قرض",
            "مخبزة",
        ],
    ),
    (
        "tourism",
        &[
            "touris",
            "hotel",
            "hôtel",
            "travel",
            "voyage",
            "سياحة",
            "فندق",
            "فنادق",
        ],
    ),
    (
        "innovation",
        &[
            "innovation",
            "startup",
            "start-up",
            "incubat",
            "ابتكار",
            "مؤسسة ناشئة",
        ],
    ),
    (
        "consulting",
        &[
            "consult",
            "accounting",
            "comptab",
            "audit",
            "conseil aux entreprises",
            "استشارات",
            "استشارة",
            "محاسبة",
        ],
    ),
    (
        "housing",
        &[
            "housing",
            "logement",
            "apartment",
            "appartement",
            "real estate",
            "immobilier",
            "سكن",
            "عقار",
        ],
    ),
    (
        "education",
        &[
            "school",
            "école",
            "ecole",
            "universit",
            "education",
            "éducation",
            "training",
            "lycée",
            "تعليم",
            "مدرسة",
            "جامعة",
            "تكوين",
        ],
    ),
    (
        "health",
        &[
            "health",
            "santé",
            "sante",
            "hospital",
            "hôpital",
            "hopital",
            "clinic",
            "clinique",
            "pharma",
            "medical",
            "médical",
            "doctor",
            "médecin",
            "صحة",
            "مستشفى",
            "عيادة",
            "صيدلية",
        ],
    ),
    (
        "technology",
        &[
            "technolog",
            "digital",
            "numérique",
            "numerique",
            "software",
            "logiciel",
            "telecom",
            "télécom",
            "internet",
            "fiber",
            "fibre",
            "broadband",
            "تكنولوجيا",
            "رقمي",
            "برمجيات",
            "اتصالات",
            "إنترنت",
            "انترنت",
        ],
    ),
    (
        "construction",
        &[
            "construction",
            "bâtiment",
            "batiment",
            "btp",
            "chantier",
            "public works",
            "travaux publics",
            "بناء",
            "أشغال عمومية",
        ],
    ),
    (
        "transport",
        &[
            "transport",
            "logistic",
            "logistique",
            "truck",
            "camion",
            "shipping",
            "airport",
            "aéroport",
            "railway",
            "ferroviaire",
            "taxi",
            "نقل",
            "شحن",
            "ميناء",
            "مطار",
        ],
    ),
    (
        "commerce",
        &[
            "commerce",
            "retail",
            "wholesale",
            "grossiste",
            "supermarket",
            "supermarché",
            "grocery",
            "épicerie",
            "store",
            "magasin",
            "تجارة",
            "متجر",
            "سوق",
        ],
    ),
];

const AI_STARTERS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "which", "can", "could", "should", "would",
    "is", "are", "does", "do", "explain", "tell me", "quel", "quelle", "quels", "quelles",
    "comment", "pourquoi", "quand", "où", "combien", "qui", "que", "qu", "quoi", "est-ce",
    "peut-on", "ما", "ماذا", "لماذا", "كيف", "متى", "أين", "اين", "هل", "كم", "من",
];

const PHRASE_OVERRIDES: &[(&str, &str)] = &[("learning bank", "services")];

/// All 58 wilayas by official code, except that Algiers and Oran take 01 and
/// 02 and hand 16 and 31 to Adrar and Chlef.
const LOCATIONS: &[(&str, &str)] = &[
    ("algiers", "01"),
    ("alger", "01"),
    ("الجزائر", "01"),
    ("oran", "02"),
    ("wahran", "02"),
    ("وهران", "02"),
    ("laghouat", "03"),
    ("الأغواط", "03"),
    ("oum el bouaghi", "04"),
    ("أم البواقي", "04"),
    ("batna", "05"),
    ("باتنة", "05"),
    ("béjaïa", "06"),
    ("bejaia", "06"),
    ("بجاية", "06"),
    ("biskra", "07"),
    ("بسكرة", "07"),
    ("béchar", "08"),
    ("bechar", "08"),
    ("بشار", "08"),
    ("blida", "09"),
    ("البليدة", "09"),
    ("bouira", "10"),
    ("البويرة", "10"),
    ("tamanrasset", "11"),
    ("تمنراست", "11"),
    ("tébessa", "12"),
    ("tebessa", "12"),
    ("تبسة", "12"),
    ("tlemcen", "13"),
    ("تلمسان", "13"),
    ("tiaret", "14"),
    ("تيارت", "14"),
    ("tizi ouzou", "15"),
    ("tizi-ouzou", "15"),
    ("تيزي وزو", "15"),
    ("adrar", "16"),
    ("أدرار", "16"),
    ("djelfa", "17"),
    ("الجلفة", "17"),
    ("jijel", "18"),
    ("جيجل", "18"),
    ("sétif", "19"),
    ("setif", "19"),
    ("سطيف", "19"),
    ("saïda", "20"),
    ("saida", "20"),
    ("سعيدة", "20"),
    ("skikda", "21"),
    ("سكيكدة", "21"),
    ("sidi bel abbès", "22"),
    ("sidi bel abbes", "22"),
    ("سيدي بلعباس", "22"),
    ("annaba", "23"),
    ("عنابة", "23"),
    ("guelma", "24"),
    ("قالمة", "24"),
    ("constantine", "25"),
    ("قسنطينة", "25"),
    ("médéa", "26"),
    ("medea", "26"),
    ("المدية", "26"),
    ("mostaganem", "27"),
    ("مستغانم", "27"),
    ("m'sila", "28"),
    ("msila", "28"),
    ("المسيلة", "28"),
    ("mascara", "29"),
    ("معسكر", "29"),
    ("ouargla", "30"),
    ("ورقلة", "30"),
    ("chlef", "31"),
    ("الشلف", "31"),
    ("el bayadh", "32"),
    ("البيض", "32"),
    ("illizi", "33"),
    ("إليزي", "33"),
    ("bordj bou arréridj", "34"),
    ("bordj bou arreridj", "34"),
    ("برج بوعريريج", "34"),
    ("boumerdès", "35"),
    ("boumerdes", "35"),
    ("بومرداس", "35"),
    ("el tarf", "36"),
    ("الطارف", "36"),
    ("tindouf", "37"),
    ("تندوف", "37"),
    ("tissemsilt", "38"),
    ("تيسمسيلت", "38"),
    ("el oued", "39"),
    ("الوادي", "39"),
    ("khenchela", "40"),
    ("خنشلة", "40"),
    ("souk ahras", "41"),
    ("سوق أهراس", "41"),
    ("tipaza", "42"),
    ("تيبازة", "42"),
    ("mila", "43"),
    ("ميلة", "43"),
    ("aïn defla", "44"),
    ("ain defla", "44"),
    ("عين الدفلى", "44"),
    ("naâma", "45"),
    ("naama", "45"),
    ("النعامة", "45"),
    ("aïn témouchent", "46"),
    ("ain temouchent", "46"),
    ("عين تموشنت", "46"),
    ("ghardaïa", "47"),
    ("ghardaia", "47"),
    ("غرداية", "47"),
    ("relizane", "48"),
    ("غليزان", "48"),
    ("timimoun", "49"),
    ("تيميمون", "49"),
    ("bordj badji mokhtar", "50"),
    ("برج باجي مختار", "50"),
    ("ouled djellal", "51"),
    ("أولاد جلال", "51"),
    ("béni abbès", "52"),
    ("beni abbes", "52"),
    ("بني عباس", "52"),
    ("in salah", "53"),
    ("عين صالح", "53"),
    ("in guezzam", "54"),
    ("عين قزام", "54"),
    ("touggourt", "55"),
    ("تقرت", "55"),
    ("djanet", "56"),
    ("جانت", "56"),
    ("el m'ghair", "57"),
    ("el mghair", "57"),
    ("المغير", "57"),
    ("el meniaa", "58"),
    ("المنيعة", "58"),
    ("wilaya", UNSCOPED_LOCATION),
    ("wilayas", UNSCOPED_LOCATION),
    ("province", UNSCOPED_LOCATION),
    ("provinces", UNSCOPED_LOCATION),
    ("ولاية", UNSCOPED_LOCATION),
    ("ولايات", UNSCOPED_LOCATION),
];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn builtin_source() -> LexiconSource {
    LexiconSource {
        market_keywords: owned(MARKET_KEYWORDS),
        data_keywords: owned(DATA_KEYWORDS),
        sectors: SECTORS
            .iter()
            .map(|(id, keywords)| SectorKeywords {
                id: id.to_string(),
                keywords: owned(keywords),
            })
            .collect(),
        ai_starters: owned(AI_STARTERS),
        phrase_overrides: PHRASE_OVERRIDES
            .iter()
            .map(|(phrase, sector)| PhraseOverride {
                phrase: phrase.to_string(),
                sector: sector.to_string(),
            })
            .collect(),
        locations: LOCATIONS
            .iter()
            .map(|(name, code)| LocationEntry {
                name: name.to_string(),
                code: code.to_string(),
            })
            .collect(),
    }
}
