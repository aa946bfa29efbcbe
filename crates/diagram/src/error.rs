use klass::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, DiagramError>;
