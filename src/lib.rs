//! Rate-based kilonova candidate filtering for streamed transient alerts.
//!
//! The crate evaluates a batch of alerts in two stages: a pure stage that
//! applies the candidate predicate, reconstructs same-filter photometry and
//! measures the fading rate ([`pipeline::evaluate`]), followed by an effectful
//! stage that posts notifications for accepted candidates
//! ([`pipeline::dispatch`]).

pub mod alerts;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod logging;
pub mod notify;
pub mod photometry;
pub mod pipeline;
pub mod sky;

pub use error::{FilterError, FilterResult};
