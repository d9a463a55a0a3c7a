//! Record Store: loads the session and city snapshots from JSON files.

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use log::info;
use serde::de::DeserializeOwned;

use crate::{
    error::AnalysisError,
    record::{City, RecordSet, Session},
};

/// Sessions with fewer guesses than this are dropped when small sessions are excluded.
pub const MIN_SESSION_GUESSES: usize = 10;

/// Locations of the input files and the cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub sessions: PathBuf,
    pub cities: PathBuf,
    pub cache: PathBuf,
}

impl DataPaths {
    /// Default file names inside `dir`.
    pub fn in_dir<P>(dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        Self {
            sessions: dir.join("sessions.json"),
            cities: dir.join("cities_with_counts.json"),
            cache: dir.join("results.json"),
        }
    }
}

/// Read-only access to the raw record files.
#[derive(Debug, Clone)]
pub struct RecordStore {
    paths: DataPaths,
}

impl RecordStore {
    #[must_use]
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    #[must_use]
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Loads all sessions, optionally dropping those with fewer than
    /// [`MIN_SESSION_GUESSES`] guesses.
    pub fn load_sessions(&self, exclude_small: bool) -> Result<RecordSet<Session>, AnalysisError> {
        let mut sessions: RecordSet<Session> = read_json_file("sessions", &self.paths.sessions)?;
        let total = sessions.len();
        if exclude_small {
            sessions.retain(|session| session.score() >= MIN_SESSION_GUESSES);
        }
        info!(
            "Loaded {} sessions from {} ({} dropped as too small)",
            sessions.len(),
            self.paths.sessions.display(),
            total - sessions.len()
        );
        Ok(sessions)
    }

    pub fn load_cities(&self) -> Result<RecordSet<City>, AnalysisError> {
        let cities: RecordSet<City> = read_json_file("cities", &self.paths.cities)?;
        info!(
            "Loaded {} cities from {}",
            cities.len(),
            self.paths.cities.display()
        );
        Ok(cities)
    }
}

fn read_json_file<T>(kind: &'static str, path: &Path) -> Result<T, AnalysisError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|source| AnalysisError::DataUnavailable {
        kind,
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        if err.is_io() {
            AnalysisError::DataUnavailable {
                kind,
                path: path.to_owned(),
                source: io::Error::from(err),
            }
        } else {
            AnalysisError::MalformedRecord {
                kind,
                path: path.to_owned(),
                source: err,
            }
        }
    })
}
