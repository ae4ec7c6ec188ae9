use std::io;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure kinds a caller may want to tell apart.
///
/// These travel inside `anyhow::Error`; recover them with `downcast_ref::<CfError>()`.
#[derive(Error, Debug)]
pub enum CfError {
    /// Expected HTML structure is missing from a fetched page.
    #[error("Could not parse page : {0}")]
    Parse(String),
    /// Display template has no placeholder to substitute.
    #[error("Invalid statement template : {0}")]
    Template(String),
    #[error("Login failed ({status}) : {reason}")]
    Auth { status: StatusCode, reason: String },
    #[error("Submission failed ({status}) : {reason}")]
    Submission { status: StatusCode, reason: String },
    #[error("Unsupported language : {0}")]
    UnsupportedLanguage(String),
    #[error("Could not access file : {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CfError {
    pub fn parse(what: impl Into<String>) -> Self {
        Self::Parse(what.into())
    }

    pub fn io(path: impl ToString, source: io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}
