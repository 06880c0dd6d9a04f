//! Weekly task lifecycle and rollover.
//!
//! Tasks are planned into ISO weeks, move through a small state machine,
//! receive one end-of-week review, and roll forward into the next week when
//! work is unfinished. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod tests;
