//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fixture JSON files found in {0}")]
    NoFixtures(PathBuf),
    #[error("unknown convention '{0}' (expected terminated, sized, or both)")]
    UnknownConvention(String),
    #[error("bad argument '{0}': expected TYPE:VALUE with TYPE one of i, u, f, c, s, null, p")]
    BadArgument(String),
}
