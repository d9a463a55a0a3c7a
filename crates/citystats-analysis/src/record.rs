//! Typed input records and the ordered collection that holds them.
//!
//! Both input files are JSON objects keyed by an opaque identifier:
//!
//! ```json
//! {
//!   "7f3c...": {
//!     "started_at": "2021-02-23T10:00:00Z",
//!     "saved_at": "2021-02-23T10:12:31Z",
//!     "cities": ["geonames-2988507", "geonames-2643743"],
//!     "ip": "203.0.113.7",
//!     "country": "France"
//!   }
//! }
//! ```
//!
//! [`RecordSet`] keeps the key order of the file. Several rankings keep
//! tied records in collection order, so this order is observable.

use std::{collections::HashMap, fmt, marker::PhantomData};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

/// A record that is stored under an identifier in its input file.
pub trait Keyed {
    /// The identifier of this record.
    fn key(&self) -> &str;
    /// Sets the identifier after the record body has been deserialized.
    fn set_key(&mut self, key: String);
}

/// One user's guessing attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub saved_at: Option<DateTime<Utc>>,
    /// Guessed city identifiers in the order they were entered.
    pub cities: Vec<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub ip: Option<String>,
    /// Country resolved from `ip` by the geolocation step, if it ran.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub country: Option<String>,
}

impl Session {
    /// Number of cities guessed in this session.
    #[must_use]
    pub fn score(&self) -> usize {
        self.cities.len()
    }

    /// Time between start and save, if both timestamps are known.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        Some(self.saved_at? - self.started_at?)
    }
}

impl Keyed for Session {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// A city from the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub country: String,
    /// Number of sessions that guessed this city.
    pub count: u64,
    /// Guesses predicted from population, zero or absent when unknown.
    #[serde(default)]
    pub expected_count: Option<f64>,
    pub population: u64,
    #[serde(default)]
    pub national_capital: bool,
    pub code: String,
}

impl City {
    /// `"Name, Country"` as used in report tables.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    /// Expected count if it is known and non-zero.
    #[must_use]
    pub fn known_expected_count(&self) -> Option<f64> {
        self.expected_count.filter(|&expected| expected != 0.0)
    }

    /// Uppercase first letter of the name, if it is one of the 26 Latin letters.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        let first = self.name.chars().next()?;
        let mut upper = first.to_uppercase();
        let letter = upper.next()?;
        (upper.next().is_none() && letter.is_ascii_uppercase()).then_some(letter)
    }
}

impl Keyed for City {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// Keyed records in input order with lookup by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> RecordSet<T>
where
    T: Keyed,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any record with the same key in place.
    pub fn insert(&mut self, record: T) {
        if let Some(&idx) = self.index.get(record.key()) {
            self.records[idx] = record;
        } else {
            self.index.insert(record.key().to_owned(), self.records.len());
            self.records.push(record);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.records.iter()
    }

    /// Mutable access to the records. Keys must not be changed through it.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.records.iter_mut()
    }

    /// Keeps only the records matching `keep`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.records.retain(keep);
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.key().to_owned(), idx))
            .collect();
    }
}

impl<T> FromIterator<T> for RecordSet<T>
where
    T: Keyed,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a RecordSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<T> Serialize for RecordSet<T>
where
    T: Keyed + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.key(), record)?;
        }
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for RecordSet<T>
where
    T: Keyed + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordSetVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for RecordSetVisitor<T>
        where
            T: Keyed + Deserialize<'de>,
        {
            type Value = RecordSet<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of records keyed by identifier")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = RecordSet::new();
                while let Some((key, mut record)) = access.next_entry::<String, T>()? {
                    record.set_key(key);
                    set.insert(record);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RecordSetVisitor(PhantomData))
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = non_empty_string(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {value}")))
}

/// Parses an ISO-8601 timestamp. Values without an offset are read as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_set_keeps_file_order() {
        let json = r#"{
            "z": {"name": "Zagreb", "country": "Croatia", "count": 3, "population": 800000, "code": "z"},
            "a": {"name": "Athens", "country": "Greece", "count": 5, "population": 600000, "code": "a"},
            "m": {"name": "Madrid", "country": "Spain", "count": 9, "population": 3000000, "code": "m"}
        }"#;
        let cities: RecordSet<City> = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = cities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert_eq!(cities.get("a").unwrap().name, "Athens");
        assert!(cities.get("x").is_none());
    }

    #[test]
    fn test_city_optional_fields_default() {
        let json = r#"{"c": {"name": "Oslo", "country": "Norway", "count": 1, "population": 700000, "code": "c"}}"#;
        let cities: RecordSet<City> = serde_json::from_str(json).unwrap();
        let oslo = cities.get("c").unwrap();
        assert_eq!(oslo.expected_count, None);
        assert!(!oslo.national_capital);
    }

    #[test]
    fn test_session_missing_and_empty_metadata() {
        let json = r#"{
            "s1": {"cities": ["a", "b"], "ip": "", "country": null},
            "s2": {"cities": [], "started_at": "2021-02-23T10:00:00+01:00", "saved_at": "2021-02-23T09:30:00"}
        }"#;
        let sessions: RecordSet<Session> = serde_json::from_str(json).unwrap();
        let s1 = sessions.get("s1").unwrap();
        assert_eq!(s1.ip, None);
        assert_eq!(s1.country, None);
        assert_eq!(s1.duration(), None);
        assert_eq!(s1.score(), 2);

        let s2 = sessions.get("s2").unwrap();
        assert_eq!(s2.duration(), Some(TimeDelta::minutes(30)));
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let json = r#"{"s": {"cities": [], "started_at": "yesterday"}}"#;
        assert!(serde_json::from_str::<RecordSet<Session>>(json).is_err());
    }

    #[test]
    fn test_retain_rebuilds_index() {
        let json = r#"{"a": {"cities": ["x"]}, "b": {"cities": ["x", "y"]}, "c": {"cities": []}}"#;
        let mut sessions: RecordSet<Session> = serde_json::from_str(json).unwrap();
        sessions.retain(|s| s.score() != 1);
        assert_eq!(sessions.len(), 2);
        assert!(sessions.get("a").is_none());
        assert_eq!(sessions.get("c").unwrap().score(), 0);
    }

    #[test]
    fn test_initial() {
        let mut city: City = serde_json::from_value(serde_json::json!({
            "name": "łódź", "country": "Poland", "count": 1, "population": 1, "code": "x"
        }))
        .unwrap();
        assert_eq!(city.initial(), None);
        city.name = "london".to_owned();
        assert_eq!(city.initial(), Some('L'));
        city.name = "Évora".to_owned();
        assert_eq!(city.initial(), None);
        city.name = String::new();
        assert_eq!(city.initial(), None);
    }
}
