//! The pull protocol: readers, stages, workers, wiring and the sink driver.

pub mod adapters;
pub mod cancel;
pub mod chain;
pub mod config;
pub mod reader;
pub mod sink;
pub mod stage;
pub mod worker;
pub mod writer;
