use crate::sim::tables::TableLoadError;
use fluxgen::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid simulation setup: {0}")]
    Setup(String),

    #[error(transparent)]
    Tables(#[from] TableLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write events: {0}")]
    Output(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
