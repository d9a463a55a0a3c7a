use std::{io, path::PathBuf};

/// Errors raised while loading records, aggregating views or persisting the cache.
///
/// Every variant aborts the run: the report is reviewed by a human, so a
/// partial result is never preferable to a loud failure.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum AnalysisError {
    /// A required input file is missing or unreadable.
    #[display("data unavailable: failed to read {kind} file {}", path.display())]
    DataUnavailable {
        kind: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// An input file was readable but a record did not match the expected shape.
    #[display("malformed record in {kind} file {}", path.display())]
    MalformedRecord {
        kind: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A ranking expected a unique maximum but several records tie.
    #[display("letter '{letter}' has {} tied cities ({}); resolve manually", cities.len(), cities.join(", "))]
    TieRequiresResolution { letter: char, cities: Vec<String> },
    /// A computed view could not be converted into its cached form.
    #[display("failed to encode view '{key}' for the cache")]
    CacheEncode {
        key: String,
        source: serde_json::Error,
    },
    /// The cache file could not be written.
    #[display("failed to write cache file {}", path.display())]
    CacheUnwritable { path: PathBuf, source: io::Error },
}
