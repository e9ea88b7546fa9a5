use serde::Serialize;

use crate::lexicon::Lexicon;
use crate::location::extract_location;
use crate::models::{ClassifiedSearch, Intent, Locale};

pub fn normalize_query(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Picks a UI locale for a query when the caller did not send one.
pub fn detect_locale(explicit: Option<Locale>, text: &str, default: Locale) -> Locale {
    if let Some(locale) = explicit {
        return locale;
    }

    let lower = text.to_lowercase();
    if lower
        .chars()
        .any(|ch| (0x0600..=0x06FF).contains(&(ch as u32)))
    {
        return Locale::Ar;
    }

    let french_marks = lower
        .chars()
        .any(|ch| "éèêàâçùûôîïœ".contains(ch));
    let french_lead = starts_with_any_word(
        &lower,
        &["le", "la", "les", "des", "du", "quel", "quelle", "comment", "pourquoi", "prix"],
    );

    if french_marks || french_lead {
        Locale::Fr
    } else {
        default
    }
}

/// One step of the classification cascade. [`CASCADE`] fixes their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    EmptyQuery,
    TrailingQuestionMark,
    QuestionStarter,
    MarketKeyword,
    PhraseOverride,
    SectorKeyword,
    DataKeyword,
    BareLocation,
    Fallback,
}

pub const CASCADE: [RuleKind; 9] = [
    RuleKind::EmptyQuery,
    RuleKind::TrailingQuestionMark,
    RuleKind::QuestionStarter,
    RuleKind::MarketKeyword,
    RuleKind::PhraseOverride,
    RuleKind::SectorKeyword,
    RuleKind::DataKeyword,
    RuleKind::BareLocation,
    RuleKind::Fallback,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub intent: Intent,
    pub matched_sector: Option<String>,
}

impl Verdict {
    fn plain(intent: Intent) -> Self {
        Self {
            intent,
            matched_sector: None,
        }
    }

    fn with_sector(intent: Intent, sector: &str) -> Self {
        Self {
            intent,
            matched_sector: Some(sector.to_string()),
        }
    }
}

impl RuleKind {
    /// Evaluates this rule alone against a normalized query.
    pub fn evaluate(self, query: &str, location: Option<&str>, lexicon: &Lexicon) -> Option<Verdict> {
        match self {
            Self::EmptyQuery => query
                .trim()
                .is_empty()
                .then(|| Verdict::plain(Intent::Fallback)),
            Self::TrailingQuestionMark => query
                .trim_end()
                .ends_with('?')
                .then(|| Verdict::plain(Intent::Ai)),
            Self::QuestionStarter => lexicon
                .ai_starters()
                .iter()
                .any(|starter| starts_with_word(query, starter))
                .then(|| Verdict::plain(Intent::Ai)),
            Self::MarketKeyword => contains_any(query, lexicon.market_keywords())
                .then(|| Verdict::plain(Intent::Market)),
            Self::PhraseOverride => lexicon
                .phrase_overrides()
                .iter()
                .find(|entry| query.contains(entry.phrase.as_str()))
                .map(|entry| Verdict::with_sector(Intent::Data, &entry.sector)),
            Self::SectorKeyword => lexicon
                .sectors()
                .iter()
                .find(|sector| contains_any(query, &sector.keywords))
                .map(|sector| Verdict::with_sector(Intent::Sector, &sector.id)),
            Self::DataKeyword => contains_any(query, lexicon.data_keywords())
                .then(|| Verdict::plain(Intent::Data)),
            Self::BareLocation => location.map(|_| Verdict::plain(Intent::Data)),
            Self::Fallback => Some(Verdict::plain(Intent::Fallback)),
        }
    }
}

/// Runs the cascade over an already normalized query and reports which rule
/// decided the outcome.
pub fn classify_normalized(
    query: &str,
    location: Option<String>,
    lexicon: &Lexicon,
) -> (ClassifiedSearch, RuleKind) {
    let (rule, verdict) = CASCADE
        .iter()
        .find_map(|rule| {
            rule.evaluate(query, location.as_deref(), lexicon)
                .map(|verdict| (*rule, verdict))
        })
        .unwrap_or((RuleKind::Fallback, Verdict::plain(Intent::Fallback)));

    let location_code = match rule {
        RuleKind::EmptyQuery => None,
        _ => location,
    };

    (
        ClassifiedSearch {
            intent: verdict.intent,
            normalized_query: query.to_string(),
            matched_sector: verdict.matched_sector,
            location_code,
        },
        rule,
    )
}

pub fn explain_search(raw: &str, lexicon: &Lexicon) -> (ClassifiedSearch, RuleKind) {
    let normalized = normalize_query(raw);
    let location = extract_location(&normalized, lexicon);
    classify_normalized(&normalized, location, lexicon)
}

pub fn classify_search(raw: &str, lexicon: &Lexicon) -> ClassifiedSearch {
    explain_search(raw, lexicon).0
}

fn contains_any(input: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| input.contains(needle.as_str()))
}

/// `starter` must be followed by a space or an apostrophe.
fn starts_with_word(input: &str, starter: &str) -> bool {
    input
        .strip_prefix(starter)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|next| matches!(next, ' ' | '\'' | '’'))
}

fn starts_with_any_word(input: &str, starters: &[&str]) -> bool {
    starters
        .iter()
        .any(|starter| starts_with_word(input, starter))
}
