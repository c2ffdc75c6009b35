#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Text(#[from] triage_types::TextError),

    #[error("{0}")]
    Schema(String),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("invalid doctor entry: {0}")]
    InvalidDoctor(String),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no specialization found for condition: {0}")]
    UnknownCondition(String),
    #[error("no doctor found in {city} for {specialization} specialization")]
    NoDoctorsFound {
        city: String,
        specialization: String,
    },
    #[error("no doctors found in {0}")]
    NoDoctorsInCity(String),
}

impl TriageError {
    /// True for errors caused by the caller's request rather than by server-side data.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TriageError::InvalidInput(_) | TriageError::Text(_))
    }

    /// True for lookups that legitimately found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TriageError::UnknownCondition(_)
                | TriageError::NoDoctorsFound { .. }
                | TriageError::NoDoctorsInCity(_)
        )
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
