use serde::{Deserialize, Serialize};

use crate::intent::RuleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    En,
    Fr,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Fr, Locale::Ar];

    /// Accepts `en`, `en-US`, `english` and the like. Anything outside the
    /// three UI locales is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Some(Self::En),
            "fr" | "fr-fr" | "fr-dz" | "french" => Some(Self::Fr),
            "ar" | "ar-dz" | "ar-sa" | "arabic" => Some(Self::Ar),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Market,
    Data,
    Sector,
    Ai,
    Fallback,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Market,
        Intent::Data,
        Intent::Sector,
        Intent::Ai,
        Intent::Fallback,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "market" => Some(Self::Market),
            "data" => Some(Self::Data),
            "sector" => Some(Self::Sector),
            "ai" => Some(Self::Ai),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Data => "data",
            Self::Sector => "sector",
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }

    /// Position in [`Intent::ALL`], used for per-intent counters.
    pub fn index(self) -> usize {
        match self {
            Self::Market => 0,
            Self::Data => 1,
            Self::Sector => 2,
            Self::Ai => 3,
            Self::Fallback => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSearch {
    pub intent: Intent,
    pub normalized_query: String,
    pub matched_sector: Option<String>,
    pub location_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayInfo {
    pub icon: &'static str,
    pub label_key: &'static str,
    pub color_class: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResolution {
    pub classification: ClassifiedSearch,
    pub rule: RuleKind,
    pub locale: Locale,
    pub route: String,
    pub display: DisplayInfo,
}
