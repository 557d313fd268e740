//! Data Transfer Objects
//!
//! Shapes that leave the process: the end-of-run report.

mod run_report;

pub use run_report::{RunReport, RunTermination};
