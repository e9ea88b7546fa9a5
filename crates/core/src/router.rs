use std::sync::Arc;

use tracing::debug;

use crate::display::display_for;
use crate::intent::{detect_locale, explain_search, RuleKind};
use crate::lexicon::Lexicon;
use crate::models::{ClassifiedSearch, Locale, SearchResolution};
use crate::route::resolve_route;

/// Classifies raw queries against one shared lexicon and turns them into
/// routes. Cheap to clone; holds no mutable state.
#[derive(Debug, Clone)]
pub struct SearchRouter {
    lexicon: Arc<Lexicon>,
    default_locale: Locale,
}

impl SearchRouter {
    pub fn new(lexicon: Arc<Lexicon>, default_locale: Locale) -> Self {
        Self {
            lexicon,
            default_locale,
        }
    }

    pub fn builtin() -> Self {
        Self::new(Lexicon::builtin(), Locale::En)
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn classify(&self, raw: &str) -> ClassifiedSearch {
        self.explain(raw).0
    }

    pub fn explain(&self, raw: &str) -> (ClassifiedSearch, RuleKind) {
        explain_search(raw, &self.lexicon)
    }

    pub fn route_for(&self, raw: &str, locale: Locale) -> String {
        resolve_route(&self.classify(raw), locale)
    }

    /// Full pipeline. Without an explicit locale one is detected from the
    /// query script.
    pub fn resolve(&self, raw: &str, locale: Option<Locale>) -> SearchResolution {
        let (classification, rule) = self.explain(raw);
        let locale = detect_locale(locale, &classification.normalized_query, self.default_locale);
        let route = resolve_route(&classification, locale);

        debug!(
            intent = classification.intent.as_str(),
            rule = ?rule,
            sector = classification.matched_sector.as_deref(),
            location = classification.location_code.as_deref(),
            locale = locale.as_code(),
            "search resolved"
        );

        SearchResolution {
            display: display_for(classification.intent),
            classification,
            rule,
            locale,
            route,
        }
    }
}

impl Default for SearchRouter {
    fn default() -> Self {
        Self::builtin()
    }
}
