use url::form_urlencoded;

use crate::lexicon::UNSCOPED_LOCATION;
use crate::models::{ClassifiedSearch, Intent, Locale};

pub const MARKETPLACE_PATH: &str = "marketplace/search";
pub const EXPLORE_PATH: &str = "explore";

pub fn target_path(intent: Intent) -> &'static str {
    match intent {
        Intent::Market => MARKETPLACE_PATH,
        Intent::Sector | Intent::Data | Intent::Ai | Intent::Fallback => EXPLORE_PATH,
    }
}

/// Builds `/{locale}/{path}?q=..[&sector=..][&location=..]`.
///
/// `ai` and `fallback` share the explore route with `data`; the page decides
/// how to render them.
pub fn resolve_route(search: &ClassifiedSearch, locale: Locale) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", &search.normalized_query);

    if search.intent == Intent::Sector {
        if let Some(sector) = search.matched_sector.as_deref() {
            params.append_pair("sector", sector);
        }
    }

    if let Some(code) = search
        .location_code
        .as_deref()
        .filter(|code| *code != UNSCOPED_LOCATION)
    {
        params.append_pair("location", code);
    }

    format!(
        "/{}/{}?{}",
        locale.as_code(),
        target_path(search.intent),
        params.finish()
    )
}
