use pyo3::PyErr;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use setback_core::Error;

/// Bad arguments from the caller, as opposed to failures of the run itself
fn is_caller_error(error: &Error) -> bool {
    match error {
        Error::InvalidConfig(_) | Error::InvalidData(_) | Error::GeometryError(_) => true,
        Error::Stage { source, .. } => is_caller_error(source),
        _ => false,
    }
}

pub(crate) fn to_py_err(error: Error) -> PyErr {
    if is_caller_error(&error) {
        PyValueError::new_err(error.to_string())
    } else {
        PyRuntimeError::new_err(error.to_string())
    }
}
