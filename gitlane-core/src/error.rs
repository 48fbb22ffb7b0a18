use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Repository has no commits yet: {0}")]
    EmptyRepository(String),

    #[error("Branch already exists: {0}")]
    BranchExists(String),

    #[error("Cannot delete the last remaining repository")]
    LastRepository,

    #[error("Script parse error: {0}")]
    Script(#[from] toml::de::Error),

    #[error("Script step {index} failed: {source}")]
    InvalidStep {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

/// Caller-facing category of an [`Error`]. None of them are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvariantViolation,
    Malformed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BranchNotFound(_)
            | Error::RepositoryNotFound(_)
            | Error::CommitNotFound(_) => ErrorKind::NotFound,
            Error::EmptyRepository(_) => ErrorKind::InvalidState,
            Error::BranchExists(_) | Error::LastRepository => ErrorKind::InvariantViolation,
            Error::Script(_) => ErrorKind::Malformed,
            Error::InvalidStep { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::BranchNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::EmptyRepository("repo".to_string()).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(Error::LastRepository.kind(), ErrorKind::InvariantViolation);
        assert_eq!(
            Error::BranchExists("main".to_string()).kind(),
            ErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_step_error_inherits_kind() {
        let err = Error::InvalidStep {
            index: 3,
            source: Box::new(Error::BranchNotFound("ghost".to_string())),
        };

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "Script step 3 failed: Branch not found: ghost"
        );
    }
}
