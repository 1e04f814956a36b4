//! Static geography and category catalog for the German scrape targets.
//!
//! City lists are grouped by population tier; within a tier the
//! declaration order is fixed so job enumeration is deterministic
//! across runs. Alternate city names widen text-search matching for
//! downstream consumers (e.g. "Munich" also matches "München").

/// Population tier of a catalog city. Tiers only affect enumeration
/// order (major first) — all tiers are scraped identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityTier {
    Major,
    Large,
    Medium,
    Small,
}

pub const MAJOR_CITIES: &[&str] = &[
    "Berlin",
    "Hamburg",
    "Munich",
    "Cologne",
    "Frankfurt",
    "Stuttgart",
    "Düsseldorf",
    "Dortmund",
    "Essen",
    "Leipzig",
    "Bremen",
    "Dresden",
    "Hanover",
    "Nuremberg",
    "Duisburg",
];

pub const LARGE_CITIES: &[&str] = &[
    "Bochum",
    "Wuppertal",
    "Bielefeld",
    "Bonn",
    "Münster",
    "Karlsruhe",
    "Mannheim",
    "Augsburg",
    "Wiesbaden",
    "Gelsenkirchen",
    "Mönchengladbach",
    "Braunschweig",
    "Chemnitz",
    "Kiel",
    "Aachen",
    "Halle",
    "Magdeburg",
    "Freiburg",
    "Krefeld",
    "Lübeck",
    "Oberhausen",
    "Erfurt",
    "Mainz",
    "Rostock",
    "Kassel",
    "Hagen",
    "Hamm",
    "Saarbrücken",
    "Mülheim",
    "Potsdam",
    "Ludwigshafen",
    "Oldenburg",
    "Leverkusen",
    "Osnabrück",
    "Solingen",
    "Heidelberg",
    "Herne",
    "Neuss",
    "Darmstadt",
    "Paderborn",
    "Regensburg",
    "Ingolstadt",
    "Würzburg",
    "Fürth",
    "Wolfsburg",
    "Offenbach",
    "Ulm",
    "Heilbronn",
    "Pforzheim",
    "Göttingen",
    "Bottrop",
    "Trier",
    "Recklinghausen",
    "Reutlingen",
    "Bremerhaven",
    "Koblenz",
    "Bergisch Gladbach",
    "Jena",
    "Remscheid",
    "Erlangen",
    "Moers",
    "Siegen",
    "Hildesheim",
    "Salzgitter",
];

pub const MEDIUM_CITIES: &[&str] = &[
    "Cottbus",
    "Witten",
    "Schwerin",
    "Kaiserslautern",
    "Gütersloh",
    "Iserlohn",
    "Düren",
    "Esslingen",
    "Ratingen",
    "Lüdenscheid",
    "Marl",
    "Ludwigsburg",
    "Velbert",
    "Flensburg",
    "Wilhelmshaven",
    "Minden",
    "Worms",
    "Viersen",
    "Norderstedt",
    "Delmenhorst",
    "Marburg",
    "Giessen",
    "Lüneburg",
    "Bayreuth",
    "Detmold",
    "Celle",
    "Fulda",
    "Aschaffenburg",
    "Lippstadt",
    "Plauen",
    "Neuwied",
    "Passau",
    "Landshut",
    "Bamberg",
    "Konstanz",
    "Stralsund",
];

pub const SMALL_CITIES: &[&str] = &[
    "Tübingen",
    "Göppingen",
    "Ravensburg",
    "Friedrichshafen",
    "Weimar",
    "Gera",
    "Speyer",
    "Schweinfurt",
    "Greifswald",
    "Wismar",
    "Baden-Baden",
    "Neustadt",
    "Landau",
    "Pirmasens",
    "Homburg",
    "Zweibrücken",
];

/// Categories scraped by default. These are the upstream scrape
/// categories; [`app_category`] maps them into the canonical
/// vocabulary used in the output.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "cafe",
    "restaurant",
    "bar",
    "pub",
    "fast_food",
    "biergarten",
    "hotel",
    "library",
    "coworking_space",
    "university",
    "cinema",
    "fuel",
    "gym",
    "spa",
    "hospital",
    "community_centre",
];

/// Alternate spellings per city (German names, umlaut-free ASCII
/// variants, the odd nickname). Cities not listed have no variants.
const CITY_ALTERNATIVES: &[(&str, &[&str])] = &[
    ("Munich", &["München", "Munchen"]),
    ("Cologne", &["Köln", "Koln"]),
    ("Nuremberg", &["Nürnberg", "Nurnberg"]),
    ("Hanover", &["Hannover"]),
    ("Brunswick", &["Braunschweig"]),
    ("Mönchengladbach", &["Monchengladbach"]),
    ("Düsseldorf", &["Dusseldorf"]),
    ("Saarbrücken", &["Saarbrucken"]),
    ("Göttingen", &["Gottingen"]),
    ("Würzburg", &["Wurzburg"]),
    ("Fürth", &["Furth"]),
    ("Kaiserslautern", &["K-Town"]), // US military nickname
    ("Lübeck", &["Lubeck"]),
    ("Münster", &["Munster"]),
    ("Osnabrück", &["Osnabruck"]),
    ("Düren", &["Duren"]),
    ("Gütersloh", &["Gutersloh"]),
    ("Lüdenscheid", &["Ludenscheid"]),
];

/// Map from scrape category to the canonical app category used in the
/// normalized output. Categories without an entry pass through
/// unchanged.
const APP_CATEGORY_MAP: &[(&str, &str)] = &[
    ("cafe", "cafe"),
    ("restaurant", "restaurant"),
    ("bar", "bar"),
    ("pub", "bar"),
    ("fast_food", "fast_food"),
    ("biergarten", "bar"),
    ("food_court", "mall_food_court"),
    ("hotel", "hotel_lobby"),
    ("hostel", "hotel_lobby"),
    ("library", "library"),
    ("coworking_space", "coworking"),
    ("university", "university_cafe"),
    ("cinema", "cinema_lobby"),
    ("theatre", "cinema_lobby"),
    ("fuel", "service_station"),
    ("gym", "gym_cafe"),
    ("spa", "spa_lounge"),
    ("hospital", "hospital_cafe"),
    ("community_centre", "community_centre"),
];

/// All catalog cities in deterministic order: major, large, medium,
/// small, each tier in declaration order.
pub fn all_cities() -> impl Iterator<Item = &'static str> {
    MAJOR_CITIES
        .iter()
        .chain(LARGE_CITIES)
        .chain(MEDIUM_CITIES)
        .chain(SMALL_CITIES)
        .copied()
}

/// Total number of catalog cities.
#[must_use]
pub fn city_count() -> usize {
    MAJOR_CITIES.len() + LARGE_CITIES.len() + MEDIUM_CITIES.len() + SMALL_CITIES.len()
}

/// Tier of a catalog city, or `None` for cities outside the catalog.
#[must_use]
pub fn city_tier(city: &str) -> Option<CityTier> {
    if MAJOR_CITIES.contains(&city) {
        Some(CityTier::Major)
    } else if LARGE_CITIES.contains(&city) {
        Some(CityTier::Large)
    } else if MEDIUM_CITIES.contains(&city) {
        Some(CityTier::Medium)
    } else if SMALL_CITIES.contains(&city) {
        Some(CityTier::Small)
    } else {
        None
    }
}

/// Alternate names for a city. Empty when none are known.
#[must_use]
pub fn alternate_names(city: &str) -> &'static [&'static str] {
    CITY_ALTERNATIVES
        .iter()
        .find(|(c, _)| *c == city)
        .map_or(&[], |(_, alts)| alts)
}

/// Canonical app category for a scrape category. Unknown categories
/// pass through unchanged.
#[must_use]
pub fn app_category(scrape_category: &str) -> &str {
    APP_CATEGORY_MAP
        .iter()
        .find(|(from, _)| *from == scrape_category)
        .map_or(scrape_category, |(_, to)| to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cities_is_deterministic_and_tier_ordered() {
        let first: Vec<&str> = all_cities().collect();
        let second: Vec<&str> = all_cities().collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "Berlin", "major tier comes first");
        assert_eq!(first.len(), city_count());
        assert_eq!(
            first.last().copied(),
            Some("Zweibrücken"),
            "small tier comes last"
        );
    }

    #[test]
    fn city_count_matches_tier_sums() {
        assert_eq!(
            city_count(),
            MAJOR_CITIES.len() + LARGE_CITIES.len() + MEDIUM_CITIES.len() + SMALL_CITIES.len()
        );
    }

    #[test]
    fn no_duplicate_cities_across_tiers() {
        let mut seen = std::collections::HashSet::new();
        for city in all_cities() {
            assert!(seen.insert(city), "duplicate city in catalog: {city}");
        }
    }

    #[test]
    fn tier_lookup() {
        assert_eq!(city_tier("Berlin"), Some(CityTier::Major));
        assert_eq!(city_tier("Marburg"), Some(CityTier::Medium));
        assert_eq!(city_tier("Weimar"), Some(CityTier::Small));
        assert_eq!(city_tier("Atlantis"), None);
    }

    #[test]
    fn alternate_names_lookup() {
        assert_eq!(alternate_names("Munich"), &["München", "Munchen"]);
        assert_eq!(alternate_names("Hanover"), &["Hannover"]);
        assert!(alternate_names("Berlin").is_empty());
    }

    #[test]
    fn app_category_maps_known_values() {
        assert_eq!(app_category("pub"), "bar");
        assert_eq!(app_category("hotel"), "hotel_lobby");
        assert_eq!(app_category("coworking_space"), "coworking");
        assert_eq!(app_category("cafe"), "cafe");
    }

    #[test]
    fn app_category_passes_unknown_through() {
        assert_eq!(app_category("planetarium"), "planetarium");
    }
}
