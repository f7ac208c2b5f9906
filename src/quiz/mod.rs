//! Quiz dealing, grading and statistics.

pub mod engine;
pub mod grading;
pub mod session;
pub mod stats;
