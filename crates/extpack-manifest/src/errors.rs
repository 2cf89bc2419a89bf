use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Feature;

/// Unexpected filesystem error while checking whether a candidate exists.
///
/// A missing file is not an error; it simply does not exist.
#[derive(Error, Debug)]
#[error("Failed to probe {}: {source}", path.display())]
pub struct ProbeError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors raised by a manifest builder
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid package.json at {}: {message}", path.display())]
    InvalidPackage { path: PathBuf, message: String },

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("Manifest already written; no further changes are allowed")]
    Finalized,
}

impl ManifestError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that abort a manifest assembly
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Failed to load environment: {0}")]
    Environment(#[source] ManifestError),

    #[error("Failed to load package data: {0}")]
    PackageData(#[source] ManifestError),

    #[error("Failed to toggle {feature}: {source}")]
    Toggle {
        feature: Feature,
        #[source]
        source: ManifestError,
    },

    #[error("Failed to read contents directory {}: {source}", path.display())]
    DirectoryScan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create {feature} scaffold: {source}")]
    Scaffold {
        feature: Feature,
        #[source]
        source: ManifestError,
    },

    #[error("Failed to register {}: {source}", path.display())]
    Registration {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("Failed to write manifest: {0}")]
    Write(#[source] ManifestError),
}
