//! Configuration, dataset loading and report orchestration for the `hsr`
//! command-line tool.

pub mod config;
pub mod datasets;
pub mod logging;
pub mod runner;
