#[cfg(feature = "python")]
use pyo3::exceptions::{PyPermissionError, PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Data format: {0}")]
    DataFormat(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Access denied")]
    AccessDenied,
}

pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(feature = "python")]
impl From<SurveyError> for PyErr {
    fn from(err: SurveyError) -> PyErr {
        match err {
            SurveyError::AccessDenied => PyPermissionError::new_err(err.to_string()),
            SurveyError::DataFormat(_) | SurveyError::ColumnNotFound(_) => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
