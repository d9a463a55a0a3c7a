use crate::{
    context::Snapshot,
    record::{City, RecordSet, Session},
};

pub(crate) fn city(id: &str, name: &str, country: &str, count: u64, population: u64) -> City {
    City {
        id: id.to_owned(),
        name: name.to_owned(),
        country: country.to_owned(),
        count,
        expected_count: None,
        population,
        national_capital: false,
        code: id.to_owned(),
    }
}

pub(crate) fn capital(id: &str, name: &str, country: &str, count: u64) -> City {
    City {
        national_capital: true,
        ..city(id, name, country, count, 1_000_000)
    }
}

pub(crate) fn session(id: &str, cities: &[&str], country: Option<&str>) -> Session {
    Session {
        id: id.to_owned(),
        started_at: None,
        saved_at: None,
        cities: cities.iter().map(|&c| c.to_owned()).collect(),
        ip: None,
        country: country.map(str::to_owned),
    }
}

pub(crate) fn snapshot(cities: Vec<City>, sessions: Vec<Session>) -> Snapshot {
    Snapshot {
        cities: cities.into_iter().collect::<RecordSet<_>>(),
        sessions: sessions.into_iter().collect::<RecordSet<_>>(),
    }
}

pub(crate) fn ids(cities: &[City]) -> Vec<&str> {
    cities.iter().map(|c| c.id.as_str()).collect()
}
