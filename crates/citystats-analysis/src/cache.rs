//! Computation Cache: memoizes computed views by name across runs.
//!
//! The cache is a flat JSON object from view name to view value. A cached
//! view is trusted as-is for the current snapshot; there is no staleness
//! check, the caller forces recomputation when the inputs change.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::Path,
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewCache {
    views: BTreeMap<String, Value>,
}

impl ViewCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a cache file, starting empty when it is absent or unreadable.
    pub fn load<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No cache at {}, starting empty", path.display());
                return Self::new();
            }
            Err(err) => {
                warn!("Ignoring unreadable cache {}: {err}", path.display());
                return Self::new();
            }
        };
        match serde_json::from_reader::<_, Self>(BufReader::new(file)) {
            Ok(cache) => {
                info!("Loaded {} cached views from {}", cache.len(), path.display());
                cache
            }
            Err(err) => {
                warn!("Ignoring malformed cache {}: {err}", path.display());
                Self::new()
            }
        }
    }

    /// Writes the cache as pretty-printed JSON with sorted keys.
    pub fn save<P>(&self, path: P) -> Result<(), AnalysisError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let unwritable = |source| AnalysisError::CacheUnwritable {
            path: path.to_owned(),
            source,
        };
        let file = File::create(path).map_err(unwritable)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|err| unwritable(err.into()))?;
        writeln!(writer).map_err(unwritable)?;
        writer.flush().map_err(unwritable)?;
        info!("Saved {} views to {}", self.len(), path.display());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.views.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.views.get(key).is_some_and(is_truthy)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns the view cached under `key`, computing and storing it first
    /// if `force` is set or no non-empty value is cached.
    ///
    /// A cached value that no longer decodes as `T` is recomputed.
    pub fn get_or_compute<T, F>(
        &mut self,
        key: &str,
        force: bool,
        compute: F,
    ) -> Result<T, AnalysisError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let cached = if force {
            None
        } else {
            self.views.get(key).filter(|v| is_truthy(v))
        };
        if let Some(cached) = cached {
            match T::deserialize(cached) {
                Ok(view) => {
                    debug!("Cache hit for view '{key}'");
                    return Ok(view);
                }
                Err(err) => warn!("Cached view '{key}' does not decode, recomputing: {err}"),
            }
        }

        debug!("Computing view '{key}'");
        let view = compute();
        let value = serde_json::to_value(&view).map_err(|source| AnalysisError::CacheEncode {
            key: key.to_owned(),
            source,
        })?;
        self.views.insert(key.to_owned(), value);
        Ok(view)
    }
}

/// Whether a cached value counts as present: `null`, `false`, zero and
/// empty strings, arrays and objects do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
