//! Buvette name matching used by imports and duplicate detection.

use std::collections::BTreeMap;

use crate::types::catalog::{BuvetteUsage, DuplicateGroup};

/// Lower-cased with runs of whitespace collapsed to one space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a sheet or file name designates the stored buvette. Sheets call
/// the away stand "Visiteurs" where the catalog says "Visiteur".
pub fn sheet_matches_buvette(sheet_name: &str, buvette_name: &str) -> bool {
    let sheet = normalize_name(sheet_name);
    let stored = normalize_name(buvette_name);
    sheet == stored || (sheet == "visiteurs" && stored == "visiteur")
}

/// Groups buvettes whose normalised names collide. Groups come out in name
/// order, members in input order.
pub fn duplicate_groups(usages: &[BuvetteUsage]) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<String, Vec<BuvetteUsage>> = BTreeMap::new();
    for usage in usages {
        groups
            .entry(normalize_name(&usage.name))
            .or_default()
            .push(usage.clone());
    }
    groups
        .into_iter()
        .filter(|(_, buvettes)| buvettes.len() > 1)
        .map(|(normalized_name, buvettes)| DuplicateGroup {
            normalized_name,
            buvettes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(id: i64, name: &str, products: i64) -> BuvetteUsage {
        BuvetteUsage {
            id,
            name: name.to_string(),
            sport: "FOOT".to_string(),
            product_count: products,
        }
    }

    #[test]
    fn normalisation_collapses_space_and_case() {
        assert_eq!(normalize_name("  Nord   Mobile 1 "), "nord mobile 1");
    }

    #[test]
    fn visiteurs_sheet_maps_to_visiteur() {
        assert!(sheet_matches_buvette("VISITEURS", "Visiteur"));
        assert!(sheet_matches_buvette("Est  1", "est 1"));
        assert!(!sheet_matches_buvette("Est 1", "Est 2"));
        assert!(!sheet_matches_buvette("Visiteur", "Visiteurs"));
    }

    #[test]
    fn only_colliding_names_are_reported() {
        let groups = duplicate_groups(&[
            usage(1, "Sud 1", 12),
            usage(2, "Nord 1", 10),
            usage(9, "sud  1", 414),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].normalized_name, "sud 1");
        assert_eq!(groups[0].buvettes.len(), 2);
        assert_eq!(groups[0].buvettes[1].product_count, 414);
    }
}
