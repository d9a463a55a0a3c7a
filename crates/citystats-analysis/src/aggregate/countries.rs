//! Views that tally the countries of guessed cities.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{context::Snapshot, tally::Tally};

/// Nationalities with fewer sessions are left out of
/// [`best_countries_by_nationality`].
pub const MIN_NATIONALITY_SESSIONS: usize = 100;

/// Number of entries in [`forgotten_countries`].
pub const FORGOTTEN_COUNTRIES: usize = 10;

/// A guessed country and how many of its cities an average session named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryShare {
    pub country: String,
    pub share: f64,
}

/// A country and the number of sessions naming at least one of its cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPresence {
    pub country: String,
    pub sessions: usize,
}

#[derive(Debug, Default)]
struct NationalityTally {
    sessions: usize,
    guessed: Tally,
}

/// The two most guessed countries for each nationality with at least
/// [`MIN_NATIONALITY_SESSIONS`] sessions.
///
/// The share is the country's guess tally divided by the nationality's
/// session count. Countries with equal tallies keep the order in which they
/// were first guessed.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn best_countries_by_nationality(snapshot: &Snapshot) -> BTreeMap<String, Vec<CountryShare>> {
    let mut by_nationality = BTreeMap::<&str, NationalityTally>::new();
    for session in &snapshot.sessions {
        let Some(nationality) = session.country.as_deref() else {
            continue;
        };
        let tally = by_nationality.entry(nationality).or_default();
        tally.sessions += 1;
        for city_id in &session.cities {
            if let Some(city) = snapshot.cities.get(city_id) {
                tally.guessed.add(&city.country);
            }
        }
    }

    by_nationality
        .into_iter()
        .filter(|(_, tally)| tally.sessions >= MIN_NATIONALITY_SESSIONS)
        .map(|(nationality, tally)| {
            let n = tally.sessions as f64;
            let best = tally
                .guessed
                .most_common(2)
                .into_iter()
                .map(|(country, count)| CountryShare {
                    country,
                    share: count as f64 / n,
                })
                .collect();
            (nationality.to_owned(), best)
        })
        .collect()
}

/// The [`FORGOTTEN_COUNTRIES`] countries named by the fewest sessions.
///
/// A country counts once per session no matter how many of its cities the
/// session guessed. Guesses of unknown cities are skipped.
#[must_use]
pub fn forgotten_countries(snapshot: &Snapshot) -> Vec<CountryPresence> {
    let mut presence = Tally::new();
    for session in &snapshot.sessions {
        let mut seen = HashSet::new();
        for city_id in &session.cities {
            let Some(city) = snapshot.cities.get(city_id) else {
                continue;
            };
            if seen.insert(city.country.as_str()) {
                presence.add(&city.country);
            }
        }
    }

    presence
        .least_common(FORGOTTEN_COUNTRIES)
        .into_iter()
        .map(|(country, sessions)| CountryPresence { country, sessions })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{city, session, snapshot};

    #[test]
    fn test_forgotten_countries_dedup_per_session() {
        let cities = vec![
            city("paris", "Paris", "France", 2, 2_000_000),
            city("lyon", "Lyon", "France", 1, 500_000),
            city("rome", "Rome", "Italy", 2, 2_800_000),
            city("vaduz", "Vaduz", "Liechtenstein", 1, 5_000),
        ];
        let sessions = vec![
            session("a", &["paris", "lyon", "rome", "ghost"], None),
            session("b", &["paris", "rome", "vaduz"], None),
        ];
        let view = forgotten_countries(&snapshot(cities, sessions));
        assert_eq!(
            view,
            vec![
                CountryPresence {
                    country: "Liechtenstein".to_owned(),
                    sessions: 1
                },
                CountryPresence {
                    country: "France".to_owned(),
                    sessions: 2
                },
                CountryPresence {
                    country: "Italy".to_owned(),
                    sessions: 2
                },
            ]
        );
    }

    #[test]
    fn test_forgotten_countries_limit() {
        let cities: Vec<_> = (0..15)
            .map(|i| city(&format!("c{i}"), "X", &format!("country{i:02}"), 1, 10_000))
            .collect();
        let ids: Vec<String> = (0..15).map(|i| format!("c{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let view = forgotten_countries(&snapshot(cities, vec![session("s", &refs, None)]));
        assert_eq!(view.len(), FORGOTTEN_COUNTRIES);
        assert_eq!(view[0].country, "country00");
    }

    #[test]
    fn test_best_countries_by_nationality() {
        let cities = vec![
            city("paris", "Paris", "France", 0, 2_000_000),
            city("rome", "Rome", "Italy", 0, 2_800_000),
            city("berlin", "Berlin", "Germany", 0, 3_600_000),
        ];
        let mut sessions = Vec::new();
        for i in 0..MIN_NATIONALITY_SESSIONS {
            let guesses: &[&str] = if i % 2 == 0 {
                &["rome", "paris", "paris", "berlin"]
            } else {
                &["rome", "missing"]
            };
            sessions.push(session(&format!("fr{i}"), guesses, Some("France")));
        }
        for i in 0..MIN_NATIONALITY_SESSIONS - 1 {
            sessions.push(session(&format!("it{i}"), &["rome"], Some("Italy")));
        }
        sessions.push(session("nowhere", &["paris"], None));

        let view = best_countries_by_nationality(&snapshot(cities, sessions));
        assert_eq!(view.len(), 1, "nationalities below the threshold are excluded");

        let france = &view["France"];
        assert_eq!(france.len(), 2);
        // Italy (100) and France (100) tie; Italy was tallied first.
        assert_eq!(france[0].country, "Italy");
        assert_eq!(france[0].share, 1.0);
        assert_eq!(france[1].country, "France");
        assert_eq!(france[1].share, 1.0);
    }
}
