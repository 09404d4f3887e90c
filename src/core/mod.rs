//! Core domain models
//!
//! Tasks, continuations, per-invocation scheduling state, failure types and
//! batch plan configuration.

pub mod config;
pub mod continuation;
pub mod error;
pub mod state;
pub mod task;

pub use continuation::*;
pub use error::*;
pub use state::*;
pub use task::*;
