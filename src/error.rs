use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Internal-consistency faults raised by the solution validator.
///
/// These are never a property of the input: a search engine that claims a
/// solution which fails re-verification has a bug, and the run must abort
/// loudly rather than reinterpret the claim as "no solution".
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("claimed solution expands clause {clause:?} to {expansion:?}, which is not a substring of the master string")]
    SolutionMismatch { clause: String, expansion: String },
    #[error("claimed solution leaves variable {variable} unbound")]
    UnboundVariable { variable: char },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
