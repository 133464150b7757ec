//! Error types shared by the library and the CLI.
//!
//! Internally everything is an `anyhow::Error` with context attached at each I/O or store
//! boundary. Errors that reach the user are tagged with an `ErrorType` through
//! `IntoResult::pub_result` so that the category of failure survives all the context layers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The user-facing category of a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory, config file or credentials are missing or invalid.
    Config,
    /// A spreadsheet document could not be opened, decoded or written.
    Workbook,
    /// The remote store rejected a request or could not be reached.
    Store,
    /// The arguments given to a command were unusable.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that has been categorized for presentation to the user.
#[derive(Debug)]
pub struct PubError {
    error_type: ErrorType,
    source: Error,
}

impl PubError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl std::error::Error for PubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Returns the `ErrorType` of `e` if it was tagged with `pub_result`.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<PubError>().map(PubError::error_type)
}

/// Tags the error of a `Result` with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Result<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|source| {
            // Keep the first tag if the error was already categorized further down.
            if source.is::<PubError>() {
                source
            } else {
                Error::new(PubError { error_type, source })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_tags_error() {
        let r: Result<()> = Err(anyhow!("connection refused"));
        let e = r.pub_result(ErrorType::Store).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Store));
        assert!(e.to_string().contains("store error"));
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn test_pub_result_keeps_first_tag() {
        let r: Result<()> = Err(anyhow!("bad zip"));
        let e = r
            .pub_result(ErrorType::Workbook)
            .pub_result(ErrorType::Store)
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Workbook));
    }

    #[test]
    fn test_untagged_error_has_no_type() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }
}
