//! Weekplan: weekly task planning, review, and rollover.
//!
//! People plan tasks into ISO weeks, review them at the end of the week, and
//! unfinished work rolls into the following week, either explicitly through
//! carry-over or automatically when a week closes without a review.
//!
//! # Architecture
//!
//! Weekplan follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task store, lifecycle, reviews, and rollover
//! - [`report`]: Completion summaries, trends, weekly digests, and manager
//!   comments
//! - [`config`]: Layered process configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod report;
pub mod task;
pub mod telemetry;
