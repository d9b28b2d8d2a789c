//! Payment obligation engine for concession contracts.
//!
//! The `billing` module resolves the payment configuration in force for a
//! contract, evaluates each configured charge against the reported period
//! measurements, applies the minimum guarantee, and assembles an ordered
//! breakdown. `config`, `error`, and `telemetry` carry the service plumbing.

pub mod billing;
pub mod config;
pub mod error;
pub mod telemetry;
