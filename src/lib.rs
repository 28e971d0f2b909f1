//! Cash-flow viability simulator for a real-estate brokerage.
//!
//! `core` holds the deterministic month-by-month projection; `api` wraps it
//! in a JSON HTTP service and a command-line interface.

pub mod api;
pub mod core;
