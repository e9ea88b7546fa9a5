use crate::lexicon::Lexicon;

/// Finds the location code mentioned in a normalized query.
///
/// Whole tokens are tried first, in query order. Only when no token is a
/// known variant does the table get scanned, in definition order, for a
/// variant contained anywhere in the query; that second pass is what picks
/// up multi-word names such as "tizi ouzou".
pub fn extract_location(query: &str, lexicon: &Lexicon) -> Option<String> {
    if let Some(code) = query
        .split_whitespace()
        .find_map(|token| lexicon.location_code(token))
    {
        return Some(code.to_string());
    }

    lexicon
        .locations()
        .find(|(name, _)| query.contains(name))
        .map(|(_, code)| code.to_string())
}
