//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into [`TriageService`].
//! Request handling never reads environment variables.
//!
//! [`TriageService`]: crate::TriageService

use crate::catalog::Catalog;
use crate::constants::DEFAULT_MAX_RESULTS;
use crate::doctors::DoctorDirectory;
use crate::{TriageError, TriageResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    catalog_file: Option<PathBuf>,
    doctors_file: Option<PathBuf>,
    max_results: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog_file: None,
            doctors_file: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `catalog_file` of `None` selects the built-in catalog; `doctors_file` of `None` selects an
    /// empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] if `max_results` is zero or a configured file does
    /// not exist.
    pub fn new(
        catalog_file: Option<PathBuf>,
        doctors_file: Option<PathBuf>,
        max_results: usize,
    ) -> TriageResult<Self> {
        if max_results == 0 {
            return Err(TriageError::InvalidInput(
                "max_results must be at least 1".into(),
            ));
        }
        for (label, file) in [("catalog", &catalog_file), ("doctor directory", &doctors_file)] {
            if let Some(path) = file {
                if !path.is_file() {
                    return Err(TriageError::InvalidInput(format!(
                        "{label} file does not exist: {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(Self {
            catalog_file,
            doctors_file,
            max_results,
        })
    }

    pub fn catalog_file(&self) -> Option<&Path> {
        self.catalog_file.as_deref()
    }

    pub fn doctors_file(&self) -> Option<&Path> {
        self.doctors_file.as_deref()
    }

    /// Number of conditions kept in an assessment.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> TriageResult<Catalog> {
        match &self.catalog_file {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }

    /// Load the configured doctor directory, or an empty one.
    pub fn load_doctors(&self) -> TriageResult<DoctorDirectory> {
        match &self.doctors_file {
            Some(path) => DoctorDirectory::load(path),
            None => Ok(DoctorDirectory::default()),
        }
    }
}

/// Parse the result limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 3.
pub fn max_results_from_env_value(value: Option<String>) -> TriageResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                TriageError::InvalidInput(format!("max results must be a positive integer: {v}"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MAX_RESULTS))
}

/// Interpret an optional environment value as a path; blank values mean unset.
pub fn path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
