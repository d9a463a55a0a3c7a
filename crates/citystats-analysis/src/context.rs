//! The explicit context threaded through a run: the loaded records and the
//! view cache, with one accessor per cached view.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use log::info;

use crate::{
    aggregate::{
        self, CountryPresence, CountryShare, LetterRanking, NationalityStats, ScorePercentiles,
    },
    cache::ViewCache,
    error::AnalysisError,
    record::{City, RecordSet, Session},
    store::RecordStore,
};

/// The read-only records of one run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub cities: RecordSet<City>,
    pub sessions: RecordSet<Session>,
}

impl Snapshot {
    pub fn load(store: &RecordStore, exclude_small: bool) -> Result<Self, AnalysisError> {
        Ok(Self {
            cities: store.load_cities()?,
            sessions: store.load_sessions(exclude_small)?,
        })
    }

    /// `guesses` as a share of all sessions.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn guess_share(&self, guesses: f64) -> f64 {
        if self.sessions.is_empty() {
            0.0
        } else {
            guesses / self.sessions.len() as f64
        }
    }
}

/// Names under which views are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewName {
    Percentiles,
    Nationalities,
    BestCountriesByNationality,
    BestKnownCities,
    BestKnownCitiesByLetter,
    BiggestCitiesByLetter,
    CitiesByPopularity,
    ForgottenCapitals,
    ForgottenCountries,
}

impl ViewName {
    pub const ALL: [Self; 9] = [
        Self::Percentiles,
        Self::Nationalities,
        Self::BestCountriesByNationality,
        Self::BestKnownCities,
        Self::BestKnownCitiesByLetter,
        Self::BiggestCitiesByLetter,
        Self::CitiesByPopularity,
        Self::ForgottenCapitals,
        Self::ForgottenCountries,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Percentiles => "percentiles",
            Self::Nationalities => "nationalities",
            Self::BestCountriesByNationality => "best_countries_by_nationality",
            Self::BestKnownCities => "best_known_cities",
            Self::BestKnownCitiesByLetter => "best_known_cities_by_letter",
            Self::BiggestCitiesByLetter => "biggest_cities_by_letter",
            Self::CitiesByPopularity => "cities_by_popularity",
            Self::ForgottenCapitals => "forgotten_capitals",
            Self::ForgottenCountries => "forgotten_countries",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.key(), f)
    }
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("unknown view '{name}'")]
pub struct UnknownViewError {
    pub name: String,
}

impl FromStr for ViewName {
    type Err = UnknownViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.key() == s)
            .ok_or_else(|| UnknownViewError { name: s.to_owned() })
    }
}

/// Which views to recompute even when cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ForcePolicy {
    #[default]
    Never,
    Views(BTreeSet<ViewName>),
    All,
}

impl ForcePolicy {
    #[must_use]
    pub fn forces(&self, view: ViewName) -> bool {
        match self {
            Self::Never => false,
            Self::Views(views) => views.contains(&view),
            Self::All => true,
        }
    }
}

/// Records and cache for one run, passed by reference to every view.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    pub snapshot: &'a Snapshot,
    pub cache: &'a mut ViewCache,
    pub force: ForcePolicy,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(snapshot: &'a Snapshot, cache: &'a mut ViewCache, force: ForcePolicy) -> Self {
        Self {
            snapshot,
            cache,
            force,
        }
    }

    fn view<T, F>(&mut self, name: ViewName, compute: F) -> Result<T, AnalysisError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce(&Snapshot) -> T,
    {
        let snapshot = self.snapshot;
        let force = self.force.forces(name);
        if force || !self.cache.contains(name.key()) {
            info!("Computing {name}");
        }
        self.cache
            .get_or_compute(name.key(), force, || compute(snapshot))
    }

    pub fn percentiles(&mut self) -> Result<ScorePercentiles, AnalysisError> {
        self.view(ViewName::Percentiles, aggregate::percentiles)
    }

    pub fn nationalities(&mut self) -> Result<BTreeMap<String, NationalityStats>, AnalysisError> {
        self.view(ViewName::Nationalities, aggregate::nationalities)
    }

    pub fn best_countries_by_nationality(
        &mut self,
    ) -> Result<BTreeMap<String, Vec<CountryShare>>, AnalysisError> {
        self.view(
            ViewName::BestCountriesByNationality,
            aggregate::best_countries_by_nationality,
        )
    }

    pub fn best_known_cities(&mut self) -> Result<Vec<City>, AnalysisError> {
        self.view(ViewName::BestKnownCities, aggregate::best_known_cities)
    }

    pub fn best_known_cities_by_letter(
        &mut self,
    ) -> Result<BTreeMap<char, LetterRanking>, AnalysisError> {
        self.view(
            ViewName::BestKnownCitiesByLetter,
            aggregate::best_known_cities_by_letter,
        )
    }

    pub fn biggest_cities_by_letter(&mut self) -> Result<BTreeMap<char, City>, AnalysisError> {
        self.view(
            ViewName::BiggestCitiesByLetter,
            aggregate::biggest_cities_by_letter,
        )
    }

    pub fn cities_by_popularity(&mut self) -> Result<Vec<City>, AnalysisError> {
        self.view(ViewName::CitiesByPopularity, aggregate::cities_by_popularity)
    }

    pub fn forgotten_capitals(&mut self) -> Result<Vec<City>, AnalysisError> {
        self.view(ViewName::ForgottenCapitals, aggregate::forgotten_capitals)
    }

    pub fn forgotten_countries(&mut self) -> Result<Vec<CountryPresence>, AnalysisError> {
        self.view(ViewName::ForgottenCountries, aggregate::forgotten_countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{capital, city, session, snapshot};

    #[test]
    fn test_view_names_round_trip() {
        for view in ViewName::ALL {
            assert_eq!(view.key().parse::<ViewName>().unwrap(), view);
        }
        assert!("nope".parse::<ViewName>().is_err());
    }

    #[test]
    fn test_cached_views_are_reused() {
        let first = snapshot(
            vec![capital("a", "Andorra la Vella", "Andorra", 1)],
            vec![session("s", &["a"], None)],
        );
        let mut cache = ViewCache::new();
        let capitals = AnalysisContext::new(&first, &mut cache, ForcePolicy::Never)
            .forgotten_capitals()
            .unwrap();
        assert_eq!(capitals.len(), 1);

        // A different snapshot does not invalidate the cached view.
        let second = snapshot(vec![city("b", "Bern", "Switzerland", 1, 1)], vec![]);
        let mut context = AnalysisContext::new(&second, &mut cache, ForcePolicy::Never);
        assert_eq!(context.forgotten_capitals().unwrap(), capitals);

        let mut forced = AnalysisContext::new(
            &second,
            &mut cache,
            ForcePolicy::Views(BTreeSet::from([ViewName::ForgottenCapitals])),
        );
        assert!(forced.forgotten_capitals().unwrap().is_empty());
    }

    #[test]
    fn test_letter_views_survive_the_cache() {
        let snapshot = snapshot(
            vec![
                city("a", "Lyon", "France", 10, 500_000),
                city("b", "Lille", "France", 10, 230_000),
            ],
            vec![],
        );
        let mut cache = ViewCache::new();
        let computed = AnalysisContext::new(&snapshot, &mut cache, ForcePolicy::Never)
            .best_known_cities_by_letter()
            .unwrap();
        let mut reloaded: ViewCache =
            serde_json::from_str(&serde_json::to_string(&cache).unwrap()).unwrap();
        let cached = AnalysisContext::new(&Snapshot::default(), &mut reloaded, ForcePolicy::Never)
            .best_known_cities_by_letter()
            .unwrap();
        assert_eq!(cached, computed);
        assert!(cached[&'L'].is_tied());
    }
}
