//! Arrival times per staff slot, keyed by buvette name.

use std::collections::HashMap;

/// Arrival times used for buvettes without a configured schedule.
pub const DEFAULT_ARRIVALS: [&str; 4] = ["17:30", "18:00", "18:30", "19:00"];

const BUILTIN_SCHEDULES: &[(&str, &[&str])] = &[
    // Hockey
    ("Buvette 1", &["17:30", "18:00", "18:30", "19:00"]),
    ("Buvette 2", &["17:30", "18:00", "18:30", "19:00"]),
    ("Buvette 3", &["17:30", "18:00", "18:30", "19:00"]),
    ("Food Genevois", &["17:30", "18:00"]),
    ("Food Bretzel", &["18:00", "19:00"]),
    ("Chalet 1", &["17:30", "17:30", "18:00"]),
    ("Chalet 2", &["17:30", "17:30"]),
    ("Chalet 3", &["17:30", "17:30", "18:00"]),
    ("Cocktail", &["17:30", "18:00"]),
    ("Home Corner", &["17:30", "18:30", "19:00"]),
    ("Visiteur", &["17:30", "18:00", "18:30"]),
    // Football
    ("Tribune Nord", &["16:30", "17:00", "17:30", "18:00"]),
    ("Tribune Sud", &["16:30", "17:00", "17:30", "18:00"]),
    ("VIP Lounge", &["16:00", "16:30", "17:00"]),
    ("Buvette Extérieure", &["16:30", "17:00", "17:30"]),
    ("Esplanade", &["16:30", "17:00", "17:30", "18:00"]),
];

#[derive(Debug, Clone)]
pub struct ArrivalSchedules {
    by_buvette: HashMap<String, Vec<String>>,
}

impl Default for ArrivalSchedules {
    fn default() -> Self {
        let by_buvette = BUILTIN_SCHEDULES
            .iter()
            .map(|(name, times)| {
                (
                    (*name).to_string(),
                    times.iter().map(|t| (*t).to_string()).collect(),
                )
            })
            .collect();
        Self { by_buvette }
    }
}

impl ArrivalSchedules {
    /// Built-in schedules with `overrides` replacing or extending entries.
    pub fn with_overrides(overrides: HashMap<String, Vec<String>>) -> Self {
        let mut schedules = Self::default();
        schedules.by_buvette.extend(overrides);
        schedules
    }

    fn times_for(&self, buvette_name: &str) -> Vec<&str> {
        match self.by_buvette.get(buvette_name) {
            Some(times) => times.iter().map(String::as_str).collect(),
            None => DEFAULT_ARRIVALS.to_vec(),
        }
    }

    /// Arrival time for the 0-based `slot_index`, `None` once the schedule
    /// runs out.
    pub fn arrival_time_for_slot(
        &self,
        buvette_name: &str,
        slot_index: usize,
    ) -> Option<String> {
        self.times_for(buvette_name)
            .get(slot_index)
            .map(|t| (*t).to_string())
    }

    pub fn max_staff_for(&self, buvette_name: &str) -> usize {
        self.times_for(buvette_name).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_buvette_follows_its_schedule() {
        let schedules = ArrivalSchedules::default();
        assert_eq!(
            schedules.arrival_time_for_slot("Food Bretzel", 1).as_deref(),
            Some("19:00")
        );
        assert_eq!(schedules.arrival_time_for_slot("Food Bretzel", 2), None);
        assert_eq!(schedules.max_staff_for("Chalet 2"), 2);
    }

    #[test]
    fn unknown_buvette_uses_default_schedule() {
        let schedules = ArrivalSchedules::default();
        assert_eq!(
            schedules.arrival_time_for_slot("Kiosque Est", 0).as_deref(),
            Some("17:30")
        );
        assert_eq!(schedules.arrival_time_for_slot("Kiosque Est", 4), None);
        assert_eq!(schedules.max_staff_for("Kiosque Est"), 4);
    }

    #[test]
    fn overrides_replace_and_extend() {
        let schedules = ArrivalSchedules::with_overrides(HashMap::from([
            ("Cocktail".to_string(), vec!["16:00".to_string()]),
            ("Kiosque Est".to_string(), vec!["15:00".to_string(), "15:30".to_string()]),
        ]));
        assert_eq!(schedules.max_staff_for("Cocktail"), 1);
        assert_eq!(
            schedules.arrival_time_for_slot("Kiosque Est", 1).as_deref(),
            Some("15:30")
        );
        assert_eq!(schedules.max_staff_for("Tribune Nord"), 4);
    }
}
