//! Deterministic random number generation
//!
//! All randomness in the simulator goes through [`RngManager`]. The single
//! stream is passed explicitly to every component that draws from it.

mod xorshift;

pub use xorshift::RngManager;
