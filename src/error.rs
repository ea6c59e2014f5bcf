use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching or decoding the dataset. All of them end the run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} was not successful: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("Content is not a JSON array of records: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while building the master and region tables
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Record {index} has no `{field}`")]
    MissingKey { index: usize, field: &'static str },

    #[error("Record {index} has a `{field}` that is not an integer: {value}")]
    InvalidKey {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("{table} database error: {source}")]
    Storage {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl LoadError {
    /// Fatal errors abort the run. Storage errors are reported per table and
    /// the next table is still refreshed.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoadError::Storage { .. })
    }

    pub(crate) fn storage(table: &'static str) -> impl Fn(rusqlite::Error) -> LoadError + Copy {
        move |source| LoadError::Storage { table, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(LoadError::MissingKey { index: 3, field: "id" }.is_fatal());
        let storage = LoadError::storage("Europe_Meteorites")(rusqlite::Error::InvalidQuery);
        assert!(!storage.is_fatal());
        assert!(storage.to_string().starts_with("Europe_Meteorites database error"));
    }

    #[test]
    fn test_encode_is_not_reported_as_io() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = IngestError::Encode(source);
        assert!(err.to_string().starts_with("Failed to encode snapshot"));
        assert!(!matches!(err, IngestError::Io(_)));
    }
}
