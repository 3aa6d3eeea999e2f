pub mod catalog;
pub mod cli;
pub mod config;
pub mod gff;
pub mod providers;
pub mod report;
pub mod synthesis;

pub use crate::synthesis::{RunSummary, Synthesizer};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegattaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, RegattaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = RegattaError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let parse_error = RegattaError::Parse("bad column count".to_string());
        assert_eq!(format!("{}", parse_error), "Parse error: bad column count");

        let catalog_error = RegattaError::Catalog("dump truncated".to_string());
        assert_eq!(format!("{}", catalog_error), "Catalog error: dump truncated");

        let config_error = RegattaError::Config("missing provider".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Invalid configuration: missing provider"
        );

        let output_error = RegattaError::Output("disk full".to_string());
        assert_eq!(format!("{}", output_error), "Output error: disk full");
    }
}
