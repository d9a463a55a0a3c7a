//! Rankings over the city reference table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{context::Snapshot, error::AnalysisError, record::City};

/// Number of entries in [`best_known_cities`].
pub const BEST_KNOWN_CITIES: usize = 20;

/// Number of entries in [`forgotten_capitals`].
pub const FORGOTTEN_CAPITALS: usize = 10;

/// Smallest population considered by [`cities_by_popularity`].
pub const POPULARITY_MIN_POPULATION: u64 = 5_000;

/// Smallest guess count considered by [`cities_by_popularity`].
pub const POPULARITY_MIN_COUNT: u64 = 50;

/// Records that are not real cities or carry a wrong population.
pub const KNOWN_BAD_CITY_CODES: [&str; 6] = [
    "geonames-3124964",
    "geonames-11777624",
    "geonames-3125239",
    "geonames-3345283",
    "geonames-2655613",
    "geonames-2639912",
];

/// The best known city for a letter, or every city sharing the top count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum LetterRanking {
    Unique(City),
    Tied(Vec<City>),
}

impl LetterRanking {
    /// The shared guess count of the ranked cities.
    #[must_use]
    pub fn count(&self) -> u64 {
        match self {
            Self::Unique(city) => city.count,
            Self::Tied(cities) => cities.first().map_or(0, |city| city.count),
        }
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        match self {
            Self::Unique(city) => std::slice::from_ref(city),
            Self::Tied(cities) => cities,
        }
    }

    /// The unique winner, or [`AnalysisError::TieRequiresResolution`].
    pub fn resolve(&self, letter: char) -> Result<&City, AnalysisError> {
        match self {
            Self::Unique(city) => Ok(city),
            Self::Tied(cities) => Err(AnalysisError::TieRequiresResolution {
                letter,
                cities: cities.iter().map(City::display_name).collect(),
            }),
        }
    }

    fn offer(&mut self, city: &City) {
        let current = self.count();
        if city.count > current {
            *self = Self::Unique(city.clone());
        } else if city.count == current {
            let mut tied = match std::mem::replace(self, Self::Tied(Vec::new())) {
                Self::Unique(winner) => vec![winner],
                Self::Tied(cities) => cities,
            };
            tied.push(city.clone());
            *self = Self::Tied(tied);
        }
    }
}

/// The [`BEST_KNOWN_CITIES`] most guessed cities.
#[must_use]
pub fn best_known_cities(snapshot: &Snapshot) -> Vec<City> {
    best_known_cities_where(snapshot, |_| true)
}

/// The [`BEST_KNOWN_CITIES`] most guessed cities among those matching `keep`.
///
/// Equal counts keep collection order.
#[must_use]
pub fn best_known_cities_where<F>(snapshot: &Snapshot, mut keep: F) -> Vec<City>
where
    F: FnMut(&City) -> bool,
{
    let mut cities: Vec<&City> = snapshot.cities.iter().filter(|c| keep(*c)).collect();
    cities.sort_by(|a, b| b.count.cmp(&a.count));
    cities
        .into_iter()
        .take(BEST_KNOWN_CITIES)
        .cloned()
        .collect()
}

/// The most guessed city per initial letter `A`..=`Z`, keeping exact ties.
#[must_use]
pub fn best_known_cities_by_letter(snapshot: &Snapshot) -> BTreeMap<char, LetterRanking> {
    let mut by_letter = BTreeMap::<char, LetterRanking>::new();
    for city in &snapshot.cities {
        let Some(letter) = city.initial() else {
            continue;
        };
        by_letter
            .entry(letter)
            .and_modify(|ranking| ranking.offer(city))
            .or_insert_with(|| LetterRanking::Unique(city.clone()));
    }
    by_letter
}

/// The most populous city per initial letter. The first city seen wins ties.
#[must_use]
pub fn biggest_cities_by_letter(snapshot: &Snapshot) -> BTreeMap<char, City> {
    let mut by_letter = BTreeMap::<char, &City>::new();
    for city in &snapshot.cities {
        let Some(letter) = city.initial() else {
            continue;
        };
        by_letter
            .entry(letter)
            .and_modify(|biggest| {
                if city.population > biggest.population {
                    *biggest = city;
                }
            })
            .or_insert(city);
    }
    by_letter
        .into_iter()
        .map(|(letter, city)| (letter, city.clone()))
        .collect()
}

/// Observed over expected guesses, if the city has a known expectation.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn popularity_ratio(city: &City) -> Option<f64> {
    city.known_expected_count()
        .map(|expected| city.count as f64 / expected)
}

/// Cities ordered from most underperforming to most overperforming
/// relative to their expected guess count.
///
/// Only cities with population of at least [`POPULARITY_MIN_POPULATION`],
/// a known expected count and at least [`POPULARITY_MIN_COUNT`] guesses are
/// ranked; [`KNOWN_BAD_CITY_CODES`] are excluded. Equal ratios keep
/// collection order.
#[must_use]
pub fn cities_by_popularity(snapshot: &Snapshot) -> Vec<City> {
    let mut ranked: Vec<(f64, &City)> = snapshot
        .cities
        .iter()
        .filter(|city| {
            city.population >= POPULARITY_MIN_POPULATION
                && city.count >= POPULARITY_MIN_COUNT
                && !KNOWN_BAD_CITY_CODES.contains(&city.code.as_str())
        })
        .filter_map(|city| popularity_ratio(city).map(|ratio| (ratio, city)))
        .collect();
    ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    ranked.into_iter().map(|(_, city)| city.clone()).collect()
}

/// The [`FORGOTTEN_CAPITALS`] least guessed national capitals.
#[must_use]
pub fn forgotten_capitals(snapshot: &Snapshot) -> Vec<City> {
    let mut capitals: Vec<&City> = snapshot
        .cities
        .iter()
        .filter(|city| city.national_capital)
        .collect();
    capitals.sort_by_key(|city| city.count);
    capitals
        .into_iter()
        .take(FORGOTTEN_CAPITALS)
        .cloned()
        .collect()
}
