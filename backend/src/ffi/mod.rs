//! Python bindings
//!
//! Only the scheduler is exposed: Python builds a simulation from a JSON
//! configuration, runs it and reads agent datasets back.

pub mod simulation;
pub mod types;
