//! Error handling for Python bindings.
//!
//! Converts Rust errors to appropriate Python exceptions.

use gtftree::ingest::IngestError;
use gtftree::IndexError;
use pyo3::exceptions::{PyIOError, PyIndexError, PyOverflowError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Convert IndexError to appropriate Python exception.
pub fn to_py_err(e: IndexError) -> PyErr {
    match e {
        IndexError::AlreadyFinalized | IndexError::NotFinalized => {
            PyRuntimeError::new_err(e.to_string())
        }
        IndexError::OutOfRange { .. } => PyIndexError::new_err(e.to_string()),
        IndexError::TooManyEntries => PyOverflowError::new_err(e.to_string()),
        IndexError::InvalidInterval { .. }
        | IndexError::LabelCountMismatch { .. }
        | IndexError::UnknownMatchType(_)
        | IndexError::UnknownStrandType(_)
        | IndexError::UnknownStrand(_) => PyValueError::new_err(e.to_string()),
    }
}

/// Convert IngestError to appropriate Python exception.
pub fn ingest_to_py_err(e: IngestError) -> PyErr {
    match e {
        IngestError::Io(io_err) => PyIOError::new_err(io_err.to_string()),
        IngestError::Index(index_err) => to_py_err(index_err),
        IngestError::Parse { .. } | IngestError::InvalidRegion(_) => {
            PyValueError::new_err(e.to_string())
        }
    }
}
