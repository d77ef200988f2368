//! Type conversion utilities for FFI boundary

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::params::ConfigError;
use crate::orchestrator::{PeriodResult, SimulationError};

/// Configuration problems surface as `ValueError`, everything else as `RuntimeError`
pub fn simulation_error_to_py(error: SimulationError) -> PyErr {
    match error {
        SimulationError::Config(_) | SimulationError::Serialization(_) => {
            PyValueError::new_err(error.to_string())
        }
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

pub fn config_error_to_py(error: ConfigError) -> PyErr {
    PyValueError::new_err(error.to_string())
}

/// Convert PeriodResult to Python dict
pub fn period_result_to_py(py: Python<'_>, result: &PeriodResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("period", result.period)?;
    dict.set_item("money", result.money)?;
    dict.set_item("debt", result.debt)?;
    dict.set_item("production", result.production)?;
    dict.set_item("sales_value", result.sales_value)?;
    dict.set_item("consumption_volume", result.consumption_volume)?;
    dict.set_item("consumption_value", result.consumption_value)?;
    dict.set_item("wage_bill", result.wage_bill)?;
    dict.set_item("dividends", result.dividends)?;
    dict.set_item("employed", result.employed)?;
    dict.set_item("job_offers", result.job_offers)?;
    dict.set_item("events", result.events)?;

    Ok(dict.into())
}
