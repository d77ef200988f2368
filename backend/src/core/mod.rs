//! Core simulation infrastructure: period clock and parameter lookup.

pub mod params;
pub mod time;
