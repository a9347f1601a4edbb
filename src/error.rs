//a Imports
use std::path::PathBuf;

//a Error
//tp Error
/// Errors arising from catalog loading, database generation, persistence
/// and solving
///
/// Configuration and database faults (the first five variants) are fatal to
/// the operation that raised them; they are never produced for a
/// no-solution or degenerate-input outcome, which the solver reports as an
/// ordinary [crate::SolveResult] instead of an `Err`
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An unrecognized star catalog name was requested
    #[error("unknown star catalog format '{0}'")]
    UnknownCatalog(String),

    /// The catalog file could not be opened
    #[error("could not open catalog file {path}: {source}")]
    CatalogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `filtsize`-like argument that must be odd was given an even value
    #[error("{what} must be odd, got {value}")]
    NotOdd { what: &'static str, value: usize },

    /// The database archive is missing, truncated or otherwise unreadable
    #[error("database archive {path} could not be read: {reason}")]
    DatabaseFile { path: PathBuf, reason: String },

    /// The database archive does not carry the properties this crate
    /// requires to interpret `star_table` and `pattern_catalog`
    #[error("database is missing required property '{0}'")]
    IncompatibleSchema(&'static str),

    /// Quadratic probing exhausted its safety bound without finding an
    /// empty slot; indicates a pattern catalog built at too high a load
    /// factor
    #[error("pattern catalog probe exceeded {0} iterations without an empty slot")]
    ProbeOverflow(usize),

    /// Wraps a lower-level (de)serialization failure from `postcard` or
    /// `serde_json`
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Wraps a `csv` parsing failure
    #[cfg(feature = "csv")]
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Wraps a generic I/O failure not already covered above
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A solve was attempted with fewer centroids than a pattern requires
    #[error("at least 4 centroids are required to solve, got {0}")]
    NotEnoughCentroids(usize),
}

#[cfg(feature = "postcard")]
impl From<postcard::Error> for Error {
    fn from(e: postcard::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
