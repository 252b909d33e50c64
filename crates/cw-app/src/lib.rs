/// Batch front-end for crywatch: directory scan, parallel analysis, reports.
pub mod batch;
pub mod cli;
pub mod report;
