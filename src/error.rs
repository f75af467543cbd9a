use std::{fmt, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open {}: {source}", path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no package files to read")]
    NoInputFiles,

    #[error("{0}")]
    Ingest(IngestFailures),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
}

impl Error {
    pub(crate) fn open_failure(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::OpenFailure {
            path: path.into(),
            source,
        }
    }
}

/// Per-file errors collected during one ingestion run.
///
/// Displays one failure per line.
#[derive(Debug, Default)]
pub struct IngestFailures(Vec<Error>);

impl IngestFailures {
    pub fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }

    /// `None` when nothing failed, otherwise the joined [`Error::Ingest`].
    pub fn into_error(self) -> Option<Error> {
        (!self.is_empty()).then_some(Error::Ingest(self))
    }
}

impl fmt::Display for IngestFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
