//! Sandpit Analysis - background tokenize and lint workers.
//!
//! Workers run off the main loop on their own threads and talk to it only
//! through channels. [`WorkerPool`] plugs them into the core dispatcher as
//! an [`sandpit_core::AnalysisBackend`].

pub mod grammar;
pub mod linter;
pub mod pool;
pub mod tokenizer;
pub mod worker;

pub use pool::{analyze, WorkerPool};
pub use worker::{Analyzer, Worker};
