pub mod display;
pub mod intent;
pub mod lexicon;
pub mod location;
pub mod models;
pub mod route;
pub mod router;

pub use display::display_for;
pub use intent::{
    classify_normalized, classify_search, detect_locale, explain_search, normalize_query,
    RuleKind, Verdict, CASCADE,
};
pub use lexicon::{
    Lexicon, LexiconError, LexiconSource, LexiconSummary, LocationEntry, PhraseOverride,
    SectorKeywords, UNSCOPED_LOCATION,
};
pub use location::extract_location;
pub use models::*;
pub use route::{resolve_route, target_path};
pub use router::SearchRouter;
