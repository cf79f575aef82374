//! Static catalogs of regions and service categories.
//!
//! Regions are the 58 Algerian wilayas, spelled without diacritics so that
//! they can be typed on any keyboard. Categories pair the value stored in the
//! `category` column with display labels.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// The 58 wilayas in official numbering order.
pub const REGIONS: [&str; 58] = [
    "Adrar",
    "Chlef",
    "Laghouat",
    "Oum El Bouaghi",
    "Batna",
    "Bejaia",
    "Biskra",
    "Bechar",
    "Blida",
    "Bouira",
    "Tamanrasset",
    "Tebessa",
    "Tlemcen",
    "Tiaret",
    "Tizi Ouzou",
    "Algiers",
    "Djelfa",
    "Jijel",
    "Setif",
    "Saida",
    "Skikda",
    "Sidi Bel Abbes",
    "Annaba",
    "Guelma",
    "Constantine",
    "Medea",
    "Mostaganem",
    "M'Sila",
    "Mascara",
    "Ouargla",
    "Oran",
    "El Bayadh",
    "Illizi",
    "Bordj Bou Arreridj",
    "Boumerdes",
    "El Tarf",
    "Tindouf",
    "Tissemsilt",
    "El Oued",
    "Khenchela",
    "Souk Ahras",
    "Tipaza",
    "Mila",
    "Ain Defla",
    "Naama",
    "Ain Temouchent",
    "Ghardaia",
    "Relizane",
    "Timimoun",
    "Bordj Badji Mokhtar",
    "Ouled Djellal",
    "Beni Abbes",
    "In Salah",
    "In Guezzam",
    "Touggourt",
    "Djanet",
    "El M'Ghair",
    "El Meniaa",
];

/// A service category: stored key plus English and Arabic labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub label_ar: &'static str,
}

pub const CATEGORIES: [Category; 12] = [
    Category { key: "plumbing", label: "Plumbing", label_ar: "سباكة" },
    Category { key: "electricity", label: "Electricity", label_ar: "كهرباء" },
    Category { key: "carpentry", label: "Carpentry", label_ar: "نجارة" },
    Category { key: "painting", label: "Painting", label_ar: "دهان" },
    Category { key: "masonry", label: "Masonry", label_ar: "بناء" },
    Category { key: "air_conditioning", label: "Air conditioning", label_ar: "تكييف وتبريد" },
    Category { key: "mechanics", label: "Mechanics", label_ar: "ميكانيك" },
    Category { key: "cleaning", label: "Cleaning", label_ar: "تنظيف" },
    Category { key: "tiling", label: "Tiling", label_ar: "تبليط" },
    Category { key: "welding", label: "Welding", label_ar: "لحام" },
    Category { key: "gardening", label: "Gardening", label_ar: "بستنة" },
    Category { key: "moving", label: "Moving", label_ar: "نقل وترحيل" },
];

/// Looks up a category by its stored key.
#[must_use]
pub fn category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Display label for a stored category key, or the key itself if unknown.
#[must_use]
pub fn category_label(key: &str) -> &str {
    category(key).map_or(key, |c| c.label)
}

/// Ranks `candidates` against partially typed `input`, best match first.
///
/// Blank input yields no suggestions. Matching is case-insensitive and fuzzy,
/// so `"tizi"` and `"tzou"` both surface "Tizi Ouzou".
#[must_use]
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(&candidate.to_lowercase(), &needle)
                .map(|score| (score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.len().cmp(&b.1.len())));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Suggests wilayas for a partially typed region.
#[must_use]
pub fn suggest_region(input: &str) -> Vec<&'static str> {
    suggest(input, REGIONS)
}

/// Suggests category keys, matching against both key and label.
#[must_use]
pub fn suggest_category(input: &str) -> Vec<&'static str> {
    let mut keys = suggest(input, CATEGORIES.iter().map(|c| c.key));
    for label in suggest(input, CATEGORIES.iter().map(|c| c.label)) {
        if let Some(found) = CATEGORIES.iter().find(|c| c.label == label) {
            if !keys.contains(&found.key) {
                keys.push(found.key);
            }
        }
    }
    keys
}
