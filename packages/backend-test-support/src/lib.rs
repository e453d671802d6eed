//! Shared helpers for the draft backend test suites.
//!
//! Logging initialisation and assertions on the problem+json error contract.

pub mod logging;
pub mod problem_details;
