//! aimalign - resumable BYU-Aims enrichment pipeline
//!
//! Enriches a table of university course learning outcomes in two stages:
//! classification (one oracle call per outcome, confidence scores against the
//! four Aims of a BYU Education) and suggestion (one oracle call per course
//! per under-represented aim, three candidate outcomes each). Every completed
//! unit is persisted before the next begins, and the output tables double as
//! checkpoints so an interrupted run resumes with zero redundant calls.

pub mod aggregate;
pub mod aims;
pub mod checkpoint;
pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod oracle;
pub mod store;
pub mod suggest;
pub mod types;

// Re-export commonly used types
pub use aims::Aim;
pub use errors::{PipelineError, Result};
