//! Random staff members for demos and load tests.

use chrono::{Datelike, Utc};
use rand::{Rng, seq::IndexedRandom};

use crate::types::staff::StaffMemberInput;

const FIRST_NAMES: &[&str] = &[
    "Lucas", "Emma", "Léo", "Chloé", "Hugo", "Léa", "Gabriel", "Manon", "Louis", "Zoé", "Nathan",
    "Camille", "Théo", "Inès", "Mathis", "Jade", "Noah", "Lola", "Ethan", "Sarah", "Maxime",
    "Clara", "Tom", "Alice", "Raphaël", "Julie", "Enzo", "Eva", "Antoine", "Marie", "Alexandre",
    "Laura", "Baptiste", "Pauline", "Quentin", "Anaïs", "Julien", "Charlotte", "Romain",
    "Océane", "Nicolas", "Margot", "Valentin", "Juliette", "Dylan", "Lou", "Kevin", "Mathilde",
    "Clément", "Elisa",
];

const LAST_NAMES: &[&str] = &[
    "Müller", "Meier", "Schmid", "Keller", "Weber", "Huber", "Schneider", "Meyer", "Steiner",
    "Fischer", "Gerber", "Brunner", "Baumann", "Frei", "Zimmermann", "Moser", "Widmer", "Wyss",
    "Graf", "Roth", "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit",
    "Durand", "Leroy", "Moreau", "Simon", "Laurent", "Lefebvre", "Michel", "Garcia", "David",
    "Bertrand", "Roux", "Vincent", "Fournier", "Morel", "Girard", "André", "Mercier", "Dupont",
    "Lambert", "Bonnet", "François", "Martinez", "Legrand",
];

pub const STAFF_TYPES: [&str; 4] = ["EXTRA", "CDI", "CDD", "STAGIAIRE"];

const MOBILE_PREFIXES: [&str; 4] = ["076", "077", "078", "079"];

/// Hourly rate range in CHF for a contract type. Unknown types pay like extras.
pub fn hourly_rate_range(staff_type: &str) -> (f64, f64) {
    match staff_type {
        "CDI" => (28.0, 38.0),
        "CDD" => (25.0, 33.0),
        "STAGIAIRE" => (15.0, 20.0),
        _ => (22.0, 28.0),
    }
}

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Swiss mobile number formatted as `07x xxx xx xx`.
pub fn random_phone<R: Rng>(rng: &mut R) -> String {
    let digits = format!("{:07}", rng.random_range(0..10_000_000u32));
    format!(
        "{} {} {} {}",
        pick(rng, &MOBILE_PREFIXES),
        &digits[..3],
        &digits[3..5],
        &digits[5..]
    )
}

pub fn random_contract_number<R: Rng>(rng: &mut R, year: i32) -> String {
    format!("PRIM-{year}-{:04}", rng.random_range(0..10_000u32))
}

pub fn random_staff_member<R: Rng>(rng: &mut R, year: i32) -> StaffMemberInput {
    let first_name = pick(rng, FIRST_NAMES);
    let last_name = pick(rng, LAST_NAMES);
    let staff_type = pick(rng, &STAFF_TYPES);
    let (low, high) = hourly_rate_range(staff_type);
    let rate = rng.random_range(low..high);

    StaffMemberInput {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: Some(format!(
            "{}.{}@example.ch",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        )),
        phone: Some(random_phone(rng)),
        hourly_rate: Some((rate * 100.0).round() / 100.0),
        contract_number: Some(random_contract_number(rng, year)),
        staff_type: Some(staff_type.to_string()),
    }
}

pub fn random_staff<R: Rng>(rng: &mut R, count: usize) -> Vec<StaffMemberInput> {
    let year = Utc::now().year();
    (0..count).map(|_| random_staff_member(rng, year)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn generated_members_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for member in random_staff(&mut rng, 200) {
            let staff_type = member.staff_type.as_deref().unwrap();
            assert!(STAFF_TYPES.contains(&staff_type));

            let (low, high) = hourly_rate_range(staff_type);
            let rate = member.hourly_rate.unwrap();
            assert!(rate >= low && rate <= high, "{rate} outside {low}..{high}");
            assert_eq!((rate * 100.0).round() / 100.0, rate);

            let phone = member.phone.as_deref().unwrap();
            assert_eq!(phone.len(), 13);
            assert!(phone.starts_with("07"));

            let contract = member.contract_number.as_deref().unwrap();
            assert!(contract.starts_with("PRIM-"));
            assert_eq!(contract.rsplit('-').next().unwrap().len(), 4);

            assert!(member.email.as_deref().unwrap().ends_with("@example.ch"));
            assert!(member.validate().is_ok());
        }
    }

    #[test]
    fn contract_numbers_are_zero_padded() {
        let mut rng = StdRng::seed_from_u64(1);
        let contract = random_contract_number(&mut rng, 2026);
        assert!(contract.starts_with("PRIM-2026-"));
        assert_eq!(contract.len(), "PRIM-2026-0000".len());
    }
}
