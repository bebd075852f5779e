//! Default catalog of drink references and serving presets.
//!
//! This module provides the built-in drink library for the system.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
///
/// This function returns a reference to the pre-built catalog, avoiding
/// the overhead of rebuilding it on every operation.
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of drink references
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut references = HashMap::new();

    {
        let mut add = |id: &str, name: &str, kind: DrinkKind, abv: f64| {
            references.insert(
                id.to_string(),
                DrinkReference {
                    id: id.to_string(),
                    name: name.to_string(),
                    kind,
                    abv,
                },
            );
        };

        // ====================================================================
        // Beers
        // ====================================================================

        add("heineken", "Heineken", DrinkKind::Beer, 5.0);
        add("guinness", "Guinness", DrinkKind::Beer, 4.2);
        add("corona", "Corona Extra", DrinkKind::Beer, 4.5);
        add("stella_artois", "Stella Artois", DrinkKind::Beer, 5.2);
        add("budweiser", "Budweiser", DrinkKind::Beer, 5.0);
        add("leffe_blonde", "Leffe Blonde", DrinkKind::Beer, 6.6);
        add("hoegaarden", "Hoegaarden", DrinkKind::Beer, 4.9);
        add("duvel", "Duvel", DrinkKind::Beer, 8.5);
        add("chimay_blue", "Chimay Blue", DrinkKind::Beer, 9.0);
        add("desperados", "Desperados", DrinkKind::Beer, 5.9);

        // Generic styles for when the label is unknown
        add("light_lager", "Light Lager", DrinkKind::Beer, 4.0);
        add("lager", "Lager", DrinkKind::Beer, 5.0);
        add("wheat_beer", "Wheat Beer", DrinkKind::Beer, 5.2);
        add("ipa", "IPA", DrinkKind::Beer, 6.5);
        add("double_ipa", "Double IPA", DrinkKind::Beer, 8.5);
        add("stout", "Stout", DrinkKind::Beer, 6.0);

        // ====================================================================
        // Wines
        // ====================================================================

        add("red_wine", "Red Wine", DrinkKind::Wine, 13.5);
        add("white_wine", "White Wine", DrinkKind::Wine, 12.5);
        add("rose_wine", "Rosé", DrinkKind::Wine, 12.0);
        add("champagne", "Champagne", DrinkKind::Wine, 12.0);

        // ====================================================================
        // Spirits
        // ====================================================================

        add("vodka", "Vodka", DrinkKind::Spirit, 40.0);
        add("gin", "Gin", DrinkKind::Spirit, 40.0);
        add("white_rum", "White Rum", DrinkKind::Spirit, 37.5);
        add("dark_rum", "Dark Rum", DrinkKind::Spirit, 40.0);
        add("whisky", "Whisky", DrinkKind::Spirit, 43.0);
        add("bourbon", "Bourbon", DrinkKind::Spirit, 45.0);
        add("tequila", "Tequila", DrinkKind::Spirit, 38.0);
        add("cognac", "Cognac", DrinkKind::Spirit, 40.0);
        add("pastis", "Pastis", DrinkKind::Spirit, 45.0);
        add("jagermeister", "Jägermeister", DrinkKind::Spirit, 35.0);
        add("limoncello", "Limoncello", DrinkKind::Spirit, 28.0);
        add("baileys", "Baileys", DrinkKind::Spirit, 17.0);
    }

    // ========================================================================
    // Serving presets
    // ========================================================================

    let beer_presets = vec![
        ServingPreset { label: "small".into(), ml: 125.0 },
        ServingPreset { label: "half".into(), ml: 250.0 },
        ServingPreset { label: "bottle".into(), ml: 330.0 },
        ServingPreset { label: "pint".into(), ml: 500.0 },
        ServingPreset { label: "litre".into(), ml: 1000.0 },
    ];

    let shot_presets = vec![
        ServingPreset { label: "small".into(), ml: 30.0 },
        ServingPreset { label: "standard".into(), ml: 40.0 },
        ServingPreset { label: "large".into(), ml: 50.0 },
    ];

    Catalog {
        references,
        beer_presets,
        shot_presets,
    }
}

/// Typical sipping speed in millilitres per minute, by kind and pace.
///
/// Used to estimate how long a freshly logged drink will take to finish.
pub fn consumption_rate_ml_per_min(kind: &DrinkKind, pace: &Pace) -> f64 {
    let (slow, average, fast) = match kind {
        DrinkKind::Beer => (17.0, 21.0, 25.0),
        DrinkKind::Wine => (6.0, 7.0, 8.0),
        DrinkKind::Cocktail => (5.0, 7.5, 10.0),
        DrinkKind::Spirit => (10.0, 20.0, 40.0),
        DrinkKind::Other => (10.0, 15.0, 20.0),
    };
    match pace {
        Pace::Slow => slow,
        Pace::Average => average,
        Pace::Fast => fast,
    }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, reference) in &self.references {
            if id.is_empty() || reference.id.is_empty() {
                errors.push("Drink reference has empty ID".to_string());
            }
            if id != &reference.id {
                errors.push(format!(
                    "Reference key '{}' doesn't match reference.id '{}'",
                    id, reference.id
                ));
            }
            if reference.name.is_empty() {
                errors.push(format!("Reference '{}' has empty name", id));
            }
            if !reference.abv.is_finite() || !(0.0..=100.0).contains(&reference.abv) {
                errors.push(format!(
                    "Reference '{}' has implausible ABV {}",
                    id, reference.abv
                ));
            }
        }

        for (family, presets) in [("beer", &self.beer_presets), ("shot", &self.shot_presets)] {
            for preset in presets {
                if preset.label.is_empty() {
                    errors.push(format!("A {} preset has an empty label", family));
                }
                if !preset.ml.is_finite() || preset.ml <= 0.0 {
                    errors.push(format!(
                        "{} preset '{}' has implausible volume {}",
                        family, preset.label, preset.ml
                    ));
                }
            }
        }

        // Check that the main kinds are represented
        let has_beer = self
            .references
            .values()
            .any(|r| r.kind == DrinkKind::Beer);
        let has_wine = self
            .references
            .values()
            .any(|r| r.kind == DrinkKind::Wine);
        let has_spirit = self
            .references
            .values()
            .any(|r| r.kind == DrinkKind::Spirit);

        if !has_beer {
            errors.push("Catalog has no beer references".to_string());
        }
        if !has_wine {
            errors.push("Catalog has no wine references".to_string());
        }
        if !has_spirit {
            errors.push("Catalog has no spirit references".to_string());
        }

        errors
    }

    /// Case-insensitive substring search over reference names.
    ///
    /// Results are sorted by name so callers can pick the first match
    /// deterministically.
    pub fn search(&self, query: &str) -> Vec<&DrinkReference> {
        let needle = query.to_lowercase();
        let mut matches: Vec<&DrinkReference> = self
            .references
            .values()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }

    /// Look up a serving preset by label. Only beers and spirits carry
    /// preset pours.
    pub fn find_preset(&self, kind: &DrinkKind, label: &str) -> Option<&ServingPreset> {
        let presets = match kind {
            DrinkKind::Beer => &self.beer_presets,
            DrinkKind::Spirit => &self.shot_presets,
            _ => return None,
        };
        presets
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert!(catalog.references.len() >= 25);
        assert_eq!(catalog.beer_presets.len(), 5);
        assert_eq!(catalog.shot_presets.len(), 3);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_main_kinds_represented() {
        let catalog = build_default_catalog();
        for kind in [DrinkKind::Beer, DrinkKind::Wine, DrinkKind::Spirit] {
            assert!(
                catalog.references.values().any(|r| r.kind == kind),
                "No reference of kind {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = build_default_catalog();

        let hits = catalog.search("guinn");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Guinness");

        let shouty = catalog.search("GUINNESS");
        assert_eq!(shouty.len(), 1);
        assert_eq!(shouty[0].id, "guinness");
    }

    #[test]
    fn test_search_returns_sorted_matches() {
        let catalog = build_default_catalog();
        let hits = catalog.search("ipa");
        assert!(hits.len() >= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].name <= pair[1].name);
        }
    }

    #[test]
    fn test_search_miss_is_empty() {
        let catalog = build_default_catalog();
        assert!(catalog.search("nonalcoholic kombucha").is_empty());
    }

    #[test]
    fn test_find_preset() {
        let catalog = build_default_catalog();

        let pint = catalog.find_preset(&DrinkKind::Beer, "pint").unwrap();
        assert_eq!(pint.ml, 500.0);

        let shouty = catalog.find_preset(&DrinkKind::Beer, "PINT").unwrap();
        assert_eq!(shouty.ml, 500.0);

        let shot = catalog.find_preset(&DrinkKind::Spirit, "standard").unwrap();
        assert_eq!(shot.ml, 40.0);

        assert!(catalog.find_preset(&DrinkKind::Wine, "pint").is_none());
        assert!(catalog.find_preset(&DrinkKind::Beer, "bathtub").is_none());
    }

    #[test]
    fn test_consumption_rates_ordered_by_pace() {
        for kind in [
            DrinkKind::Beer,
            DrinkKind::Wine,
            DrinkKind::Cocktail,
            DrinkKind::Spirit,
            DrinkKind::Other,
        ] {
            let slow = consumption_rate_ml_per_min(&kind, &Pace::Slow);
            let average = consumption_rate_ml_per_min(&kind, &Pace::Average);
            let fast = consumption_rate_ml_per_min(&kind, &Pace::Fast);
            assert!(slow > 0.0);
            assert!(slow < average && average < fast, "rates out of order for {:?}", kind);
        }
    }

    #[test]
    fn test_validate_catches_bad_reference() {
        let mut catalog = build_default_catalog();
        catalog.references.insert(
            "moonshine".into(),
            DrinkReference {
                id: "hooch".into(),
                name: "".into(),
                kind: DrinkKind::Spirit,
                abv: 150.0,
            },
        );

        let errors = catalog.validate();
        assert_eq!(errors.len(), 3);
    }
}
