use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NaipError>;

#[derive(Error, Debug)]
pub enum NaipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Listing parse error: {message}")]
    Parse { message: String },

    #[error("Year {year} not found in the NAIP listing")]
    YearNotFound { year: u16 },

    #[error("No NAIP data for state '{state}' in year {year}")]
    PairNotFound { year: u16, state: String },

    #[error("No composite imagery folders for {state} in {year}")]
    NoComposites { year: u16, state: String },

    #[error("Invalid state abbreviation: '{code}'")]
    InvalidState { code: String },

    #[error("Extraction failed: {path}")]
    Extraction { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("All {count} downloads failed")]
    BatchFailed { count: usize },
}

impl NaipError {
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        NaipError::Parse {
            message: message.into(),
        }
    }
}
