//! Error handling for sdsbuf

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// The error type for buffer operations.
///
/// Only two conditions can fail a buffer primitive: the allocator refusing
/// memory (`Alloc`, `Limit`) and a caller breaking an operation's contract
/// (`Contract`, `InvalidHandle`). The remaining variants come from loading
/// configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
    #[error("Limit exceeded: {0}")]
    Limit(String),
    #[error("Contract violation: {0}")]
    Contract(String),
    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("System error: {0}")]
    System(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn limit<S: Into<String>>(msg: S) -> Self {
        Error::Limit(msg.into())
    }
    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Error::Contract(msg.into())
    }
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Whether the error reports memory exhaustion rather than a caller bug.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Error::Alloc(_) | Error::Limit(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::System(e) => e,
            Error::Alloc(_) | Error::Limit(_) => io::Error::new(io::ErrorKind::OutOfMemory, err),
            Error::Contract(_) | Error::InvalidHandle(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            Error::Config(_) | Error::Json(_) => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn refused_reservation() -> TryReserveError {
        let mut v: Vec<u8> = Vec::new();
        v.try_reserve_exact(usize::MAX).unwrap_err()
    }

    #[test]
    fn test_error_alloc() {
        let e: Error = refused_reservation().into();
        assert!(matches!(e, Error::Alloc(_)));
        assert!(e.is_exhaustion());
        assert!(format!("{}", e).starts_with("Allocation failed"));
    }

    #[test]
    fn test_error_limit() {
        let e = Error::limit("length 5000000000 exceeds header width");
        assert!(matches!(e, Error::Limit(_)));
        assert!(e.is_exhaustion());
        assert!(format!("{}", e).contains("header width"));
    }

    #[test]
    fn test_error_contract() {
        let e = Error::contract("increment 5 exceeds free space 2");
        assert!(matches!(e, Error::Contract(_)));
        assert!(!e.is_exhaustion());
        assert!(format!("{}", e).contains("free space 2"));
    }

    #[test]
    fn test_error_invalid_handle() {
        let e = Error::InvalidHandle(42);
        assert_eq!(format!("{}", e), "Invalid handle: 42");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "config missing");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::System(_)));
        assert!(format!("{}", e).contains("config missing"));
    }

    #[test]
    fn test_error_into_io_error_kind() {
        let oom: io::Error = Error::limit("too big").into();
        assert_eq!(oom.kind(), io::ErrorKind::OutOfMemory);

        let bad: io::Error = Error::contract("over-commit").into();
        assert_eq!(bad.kind(), io::ErrorKind::InvalidInput);

        let passthrough: io::Error =
            Error::System(io::Error::new(io::ErrorKind::BrokenPipe, "pipe")).into();
        assert_eq!(passthrough.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_result_type() {
        fn returns_ok() -> Result<usize> {
            Ok(7)
        }

        fn returns_err() -> Result<usize> {
            Err(Error::contract("nope"))
        }

        assert_eq!(returns_ok().unwrap(), 7);
        assert!(returns_err().is_err());
    }
}
