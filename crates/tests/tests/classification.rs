use boussole_core::{
    classify_search, display_for, resolve_route, Intent, Lexicon, Locale, RuleKind,
    SearchRouter, CASCADE,
};
use proptest::prelude::*;
use url::form_urlencoded;

fn classify(query: &str) -> boussole_core::ClassifiedSearch {
    classify_search(query, &Lexicon::builtin())
}

fn query_param(route: &str, name: &str) -> Option<String> {
    let (_, query) = route.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[test]
fn question_mark_precedes_market() {
    assert_eq!(classify("price of bread?").intent, Intent::Ai);
}

#[test]
fn learning_bank_override_precedes_sector_and_data() {
    let search = classify("learning bank loans");
    assert_eq!(search.intent, Intent::Data);
    assert_eq!(search.matched_sector.as_deref(), Some("services"));
}

#[test]
fn earlier_sector_wins_over_later_one() {
    let lexicon = Lexicon::builtin();
    let sectors = lexicon.sectors();
    let agriculture = sectors.iter().position(|s| s.id == "agriculture").unwrap();
    let energy = sectors.iter().position(|s| s.id == "energy").unwrap();
    assert!(agriculture < energy);

    let search = classify("solar powered greenhouse");
    assert_eq!(search.intent, Intent::Sector);
    assert_eq!(search.matched_sector.as_deref(), Some("agriculture"));

    let search = classify("usine de panneaux solaires");
    assert_eq!(search.matched_sector.as_deref(), Some("energy"));
}

#[test]
fn sector_ids_follow_backend_taxonomy() {
    for (query, sector) in [
        ("commerce oran", "commerce"),
        ("construction permits", "construction"),
        ("consulting firms", "consulting"),
        ("technology parks", "technology"),
        ("fibre internet bejaia", "technology"),
        ("microcredit loans", "services"),
    ] {
        let search = classify(query);
        assert_eq!(search.intent, Intent::Sector, "{query}");
        assert_eq!(search.matched_sector.as_deref(), Some(sector), "{query}");
    }
}

#[test]
fn bare_location_defaults_to_data() {
    let search = classify("oran");
    assert_eq!(search.intent, Intent::Data);
    assert_eq!(search.location_code.as_deref(), Some("02"));

    for (query, code) in [("tipaza", "42"), ("el oued", "39"), ("تمنراست", "11")] {
        let search = classify(query);
        assert_eq!(search.intent, Intent::Data, "{query}");
        assert_eq!(search.location_code.as_deref(), Some(code), "{query}");
    }
}

#[test]
fn generic_location_is_not_routed() {
    let search = classify("wilaya statistics");
    assert_eq!(search.location_code.as_deref(), Some("all"));
    let route = resolve_route(&search, Locale::En);
    assert!(!route.contains("location="));
}

#[test]
fn market_keywords_as_substrings() {
    assert_eq!(classify("I want to buy a used iphone").intent, Intent::Market);
}

#[test]
fn multilingual_queries() {
    let router = SearchRouter::builtin();

    let resolution = router.resolve("Pourquoi le chômage augmente à Annaba", None);
    assert_eq!(resolution.classification.intent, Intent::Ai);
    assert_eq!(resolution.rule, RuleKind::QuestionStarter);
    assert_eq!(resolution.locale, Locale::Fr);
    assert_eq!(resolution.classification.location_code.as_deref(), Some("23"));

    let resolution = router.resolve("بطالة الشباب في سطيف", None);
    assert_eq!(resolution.classification.intent, Intent::Data);
    assert_eq!(resolution.rule, RuleKind::DataKeyword);
    assert_eq!(resolution.classification.location_code.as_deref(), Some("19"));
    assert_eq!(resolution.locale, Locale::Ar);

    let resolution = router.resolve("Données agricoles Tizi Ouzou", Some(Locale::Fr));
    assert_eq!(resolution.classification.intent, Intent::Sector);
    assert_eq!(resolution.classification.matched_sector.as_deref(), Some("agriculture"));
    assert_eq!(
        resolution.route,
        "/fr/explore?q=donn%C3%A9es+agricoles+tizi+ouzou&sector=agriculture&location=15"
    );
}

#[test]
fn cascade_ends_with_total_fallback() {
    assert_eq!(CASCADE.first(), Some(&RuleKind::EmptyQuery));
    assert_eq!(CASCADE.last(), Some(&RuleKind::Fallback));
}

#[test]
fn display_is_total() {
    for intent in Intent::ALL {
        let display = display_for(intent);
        assert!(!display.icon.is_empty());
        assert!(display.label_key.starts_with("search.intent."));
    }
}

proptest! {
    #[test]
    fn classification_is_total(query in any::<String>()) {
        let router = SearchRouter::builtin();
        let resolution = router.resolve(&query, None);
        prop_assert!(Intent::ALL.contains(&resolution.classification.intent));
        prop_assert!(resolution.route.starts_with('/'));
        if resolution.classification.normalized_query.is_empty() {
            prop_assert_eq!(resolution.classification.intent, Intent::Fallback);
            prop_assert_eq!(resolution.classification.location_code, None);
        }
    }

    #[test]
    fn route_query_round_trips(query in "\\PC{0,40}", locale in prop::sample::select(Locale::ALL.to_vec())) {
        let search = classify(&query);
        let route = resolve_route(&search, locale);
        prop_assert_eq!(query_param(&route, "q"), Some(search.normalized_query.clone()));
        let prefix = format!("/{}/", locale.as_code());
        prop_assert!(route.starts_with(&prefix));
    }

    #[test]
    fn trailing_question_mark_is_always_ai(query in "[a-z ]{1,30}") {
        let search = classify(&format!("{query}?"));
        prop_assert_eq!(search.intent, Intent::Ai);
    }
}
