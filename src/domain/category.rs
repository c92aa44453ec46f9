// ============================================================
// Layer 3: Category Taxonomy
// ============================================================
// The one authoritative list of product categories.
//
// Three places need to agree on what index a category has:
//   - the miner, when it resolves catalog tags to a category
//   - the feature encoder, which writes index / (C - 1)
//   - the inference boundary, which encodes user input
//
// If any of them disagreed, a model trained on one index
// layout would silently score products under another.
// So the index IS the enum discriminant, and nothing else
// in the crate keeps its own copy of the list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A product category. The declaration order is the encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FruitsAndVegetables,
    Legumes,
    CerealsAndGrains,
    NutsAndSeeds,
    Dairy,
    Eggs,
    FishAndSeafood,
    Poultry,
    Meats,
    Beverages,
    Snacks,
    Sweets,
    ReadyMeals,
    CondimentsAndSauces,
    FatsAndOils,
    Other,
}

impl Category {
    /// Every category in index order.
    pub const ALL: [Category; 16] = [
        Category::FruitsAndVegetables,
        Category::Legumes,
        Category::CerealsAndGrains,
        Category::NutsAndSeeds,
        Category::Dairy,
        Category::Eggs,
        Category::FishAndSeafood,
        Category::Poultry,
        Category::Meats,
        Category::Beverages,
        Category::Snacks,
        Category::Sweets,
        Category::ReadyMeals,
        Category::CondimentsAndSauces,
        Category::FatsAndOils,
        Category::Other,
    ];

    /// Number of categories (C in the encoding formula).
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based encoding index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Index scaled into [0, 1] as `index / (C - 1)`.
    pub fn normalized_index(self) -> f32 {
        self.index() as f32 / (Self::COUNT - 1) as f32
    }

    /// Stable kebab-case name used in JSON files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Category::FruitsAndVegetables => "fruits-and-vegetables",
            Category::Legumes => "legumes",
            Category::CerealsAndGrains => "cereals-and-grains",
            Category::NutsAndSeeds => "nuts-and-seeds",
            Category::Dairy => "dairy",
            Category::Eggs => "eggs",
            Category::FishAndSeafood => "fish-and-seafood",
            Category::Poultry => "poultry",
            Category::Meats => "meats",
            Category::Beverages => "beverages",
            Category::Snacks => "snacks",
            Category::Sweets => "sweets",
            Category::ReadyMeals => "ready-meals",
            Category::CondimentsAndSauces => "condiments-and-sauces",
            Category::FatsAndOils => "fats-and-oils",
            Category::Other => "other",
        }
    }

    /// Catalog tag keywords (language prefix stripped) that map to this category.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::FruitsAndVegetables => &[
                "fruits", "vegetables", "fresh-fruits", "fresh-vegetables",
                "fruits-and-vegetables-based-foods", "fruits-based-foods",
                "vegetables-based-foods", "apples", "bananas", "tomatoes",
                "frozen-vegetables", "canned-vegetables", "dried-fruits",
            ],
            Category::Legumes => &[
                "legumes", "pulses", "lentils", "chickpeas", "beans",
                "legumes-and-their-products", "tofu",
            ],
            Category::CerealsAndGrains => &[
                "cereals-and-potatoes", "cereals-and-their-products", "breads",
                "pastas", "rices", "breakfast-cereals", "flours", "potatoes",
            ],
            Category::NutsAndSeeds => &[
                "nuts", "seeds", "nuts-and-their-products", "peanuts", "almonds",
                "nut-butters",
            ],
            Category::Dairy => &[
                "dairies", "milks", "cheeses", "yogurts", "fermented-milk-products",
                "butters", "creams",
            ],
            Category::Eggs => &["eggs", "chicken-eggs"],
            Category::FishAndSeafood => &[
                "seafood", "fishes", "fish-and-seafood", "canned-fishes", "tunas",
                "salmons", "shrimps",
            ],
            Category::Poultry => &["poultries", "chickens", "chicken-breasts", "turkeys"],
            Category::Meats => &[
                "meats", "beef", "pork", "hams", "sausages", "prepared-meats",
                "meat-based-products",
            ],
            Category::Beverages => &[
                "beverages", "waters", "juices", "fruit-juices", "sodas",
                "carbonated-drinks", "coffees", "teas", "plant-based-milks",
            ],
            Category::Snacks => &[
                "snacks", "salty-snacks", "chips-and-fries", "crisps", "crackers",
                "appetizers",
            ],
            Category::Sweets => &[
                "sweet-snacks", "sweets", "chocolates", "confectioneries",
                "biscuits-and-cakes", "biscuits", "candies", "desserts",
                "ice-creams", "sweet-spreads",
            ],
            Category::ReadyMeals => &[
                "meals", "prepared-meals", "pizzas", "frozen-meals", "sandwiches",
                "soups",
            ],
            Category::CondimentsAndSauces => &[
                "condiments", "sauces", "mustards", "ketchup", "dressings", "spices",
            ],
            Category::FatsAndOils => &[
                "fats", "vegetable-oils", "olive-oils", "oils", "margarines",
            ],
            Category::Other => &[],
        }
    }

    /// Resolve a product's hierarchical category tags to one category.
    ///
    /// Catalog tags are ordered general → specific, so we walk them from the
    /// end and take the first tag we recognise. Unrecognised products fall
    /// back to `Other`.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Category {
        tags.iter()
            .rev()
            .find_map(|tag| {
                let bare = strip_language(tag.as_ref());
                Self::ALL
                    .iter()
                    .copied()
                    .find(|c| c.keywords().contains(&bare))
            })
            .unwrap_or(Category::Other)
    }
}

/// "en:fruits" → "fruits"
pub fn strip_language(tag: &str) -> &str {
    let tag = tag.trim();
    match tag.split_once(':') {
        Some((prefix, rest)) if prefix.len() <= 3 => rest,
        _ => tag,
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                format!("unknown category '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_declaration_order() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert_eq!(Category::COUNT, 16);
    }

    #[test]
    fn test_normalized_index_bounds() {
        assert_eq!(Category::FruitsAndVegetables.normalized_index(), 0.0);
        assert_eq!(Category::Other.normalized_index(), 1.0);
        assert!((Category::Meats.normalized_index() - 8.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_name_round_trip() {
        for c in Category::ALL {
            assert_eq!(c.name().parse::<Category>().unwrap(), c);
            // serde uses the same kebab-case spelling
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.name()));
        }
        assert!("spaceships".parse::<Category>().is_err());
    }

    #[test]
    fn test_most_specific_tag_wins() {
        let tags = ["en:snacks", "en:sweet-snacks", "en:cocoa-and-its-products", "en:chocolates"];
        assert_eq!(Category::from_tags(&tags[..]), Category::Sweets);

        let butter = ["en:dairies", "en:fats", "en:butters"];
        assert_eq!(Category::from_tags(&butter[..]), Category::Dairy);
    }

    #[test]
    fn test_unknown_tags_fall_back_to_other() {
        assert_eq!(Category::from_tags(&["en:pet-food"][..]), Category::Other);
        assert_eq!(Category::from_tags::<&str>(&[]), Category::Other);
    }

    #[test]
    fn test_strip_language() {
        assert_eq!(strip_language("en:meats"), "meats");
        assert_eq!(strip_language("fr:viandes"), "viandes");
        assert_eq!(strip_language("meats"), "meats");
    }
}
