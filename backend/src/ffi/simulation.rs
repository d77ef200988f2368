//! PyO3 wrapper for Simulation
//!
//! # Example (from Python)
//!
//! ```python
//! from macro_simulator_core_rs import Simulation
//!
//! sim = Simulation.from_json(open("scenario.json").read())
//! while not sim.is_finished():
//!     result = sim.run_period()
//!     print(result["period"], result["employed"])
//!
//! print(sim.get_data("firm_0", "production", 1))
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{config_error_to_py, period_result_to_py, simulation_error_to_py};
use crate::agents::AgentId;
use crate::orchestrator::{Simulation as RustSimulation, SimulationConfig};

#[pyclass(name = "Simulation")]
pub struct PySimulation {
    inner: RustSimulation,
}

#[pymethods]
impl PySimulation {
    /// Create a simulation from a JSON configuration string
    ///
    /// Raises ValueError on any configuration problem.
    #[staticmethod]
    fn from_json(config: &str) -> PyResult<Self> {
        let config = SimulationConfig::from_json(config).map_err(simulation_error_to_py)?;
        let inner = RustSimulation::new(config).map_err(simulation_error_to_py)?;
        Ok(PySimulation { inner })
    }

    /// Create a simulation from a configuration dict
    #[staticmethod]
    fn from_dict(py: Python<'_>, config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let json: String = py
            .import("json")?
            .call_method1("dumps", (config,))?
            .extract()?;
        Self::from_json(&json)
    }

    /// Run one period and return its totals
    fn run_period(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.run_period().map_err(simulation_error_to_py)?;
        period_result_to_py(py, &result)
    }

    /// Run every remaining period
    fn run(&mut self, py: Python<'_>) -> PyResult<Py<PyList>> {
        let results = self.inner.run().map_err(simulation_error_to_py)?;
        let list = PyList::empty(py);
        for result in &results {
            list.append(period_result_to_py(py, result)?)?;
        }
        Ok(list.into())
    }

    fn current_period(&self) -> usize {
        self.inner.current_period()
    }

    fn total_periods(&self) -> usize {
        self.inner.total_periods()
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn config_hash(&self) -> String {
        self.inner.config_hash().to_string()
    }

    /// Value of `key` for an agent such as `"firm_3"` in a closed period
    ///
    /// Returns None if the agent, key or period is unknown.
    fn get_data(&self, agent: &str, key: &str, period: usize) -> PyResult<Option<f64>> {
        let agent: AgentId = agent.parse().map_err(config_error_to_py)?;
        Ok(self.inner.get_data(agent, key, period))
    }

    /// Sum of `key` over a sector in a closed period
    fn sector_total(&self, sector: &str, key: &str, period: usize) -> Option<f64> {
        self.inner.sector_total(sector, key, period)
    }

    /// Snapshot of the last closed period as JSON
    fn snapshot_json(&self) -> PyResult<String> {
        self.inner
            .snapshot()
            .and_then(|snapshot| snapshot.to_json())
            .map_err(simulation_error_to_py)
    }
}
