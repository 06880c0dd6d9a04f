//! Step definitions for weekly cycle BDD scenarios.

pub mod then;
pub mod when;
pub mod world;
