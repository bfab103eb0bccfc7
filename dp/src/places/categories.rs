//! Category label -> provider type identifier table

use std::collections::BTreeMap;

use tracing::debug;

/// Identifier used when a label is not in the table
pub const FALLBACK_CATEGORY: &str = "restaurant";

/// Built-in labels, in display order
pub const BUILTIN_CATEGORIES: &[(&str, &str)] = &[
    // Culture & arts
    ("Art Gallery", "art_gallery"),
    ("Museum", "museum"),
    ("Performing Arts Theater", "performing_arts_theater"),
    // Entertainment
    ("Amusement Park", "amusement_park"),
    ("Aquarium", "aquarium"),
    ("Bowling Alley", "bowling_alley"),
    ("Comedy Club", "comedy_club"),
    ("Concert Hall", "concert_hall"),
    ("Karaoke", "karaoke"),
    ("Movie Theater", "movie_theater"),
    ("Night Club", "night_club"),
    ("Observation Deck", "observation_deck"),
    ("Planetarium", "planetarium"),
    ("Zoo", "zoo"),
    // Outdoors
    ("Botanical Garden", "botanical_garden"),
    ("Hiking Area", "hiking_area"),
    ("Park", "park"),
    ("Picnic Ground", "picnic_ground"),
    // Food & drinks
    ("Bar", "bar"),
    ("Cafe", "cafe"),
    ("Coffee Shop", "coffee_shop"),
    ("Dessert Shop", "dessert_shop"),
    ("Fine Dining", "fine_dining_restaurant"),
    ("French", "french_restaurant"),
    ("Greek", "greek_restaurant"),
    ("Italian", "italian_restaurant"),
    ("Japanese", "japanese_restaurant"),
    ("Korean", "korean_restaurant"),
    ("Mexican", "mexican_restaurant"),
    ("Pizza", "pizza_restaurant"),
    ("Seafood", "seafood_restaurant"),
    ("Spanish", "spanish_restaurant"),
    ("Steakhouse", "steak_house"),
    ("Sushi", "sushi_restaurant"),
    ("Thai", "thai_restaurant"),
    ("Vegan", "vegan_restaurant"),
    ("Vegetarian", "vegetarian_restaurant"),
];

/// Maps human-facing category labels to places-search type identifiers
///
/// Lookup is exact and total: unknown labels resolve to [`FALLBACK_CATEGORY`].
#[derive(Debug, Clone)]
pub struct CategoryTable {
    /// Labels in display order
    order: Vec<String>,
    entries: BTreeMap<String, String>,
}

impl CategoryTable {
    /// The built-in table
    pub fn builtin() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }

    /// The built-in table extended (or overridden) by configured entries
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        debug!(extra = extra.len(), "CategoryTable::with_overrides: called");
        let mut order: Vec<String> = BUILTIN_CATEGORIES.iter().map(|(label, _)| label.to_string()).collect();
        let mut entries: BTreeMap<String, String> = BUILTIN_CATEGORIES
            .iter()
            .map(|(label, id)| (label.to_string(), id.to_string()))
            .collect();

        for (label, id) in extra {
            if entries.insert(label.clone(), id.clone()).is_none() {
                order.push(label.clone());
            }
        }

        Self { order, entries }
    }

    /// Resolve a label to its provider identifier
    pub fn resolve(&self, label: &str) -> &str {
        match self.entries.get(label) {
            Some(id) => id.as_str(),
            None => {
                debug!(%label, "CategoryTable::resolve: unknown label, using fallback");
                FALLBACK_CATEGORY
            }
        }
    }

    /// Whether the label is in the table
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// `(label, identifier)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|label| self.entries.get(label).map(|id| (label.as_str(), id.as_str())))
    }

    /// Labels in display order
    pub fn labels(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}
