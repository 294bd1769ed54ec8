use thiserror::Error;

use crate::error::EngineError;

#[derive(Error, Debug)]
pub enum SeasonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {name}")]
    MissingColumn { name: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
