//! Descriptive statistics, leakage checks, text reports and SVG charts for a
//! DNA sequence dataset split into train, test and validation files.

pub mod analysis;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod report;
pub mod sample;
pub mod stats;
pub mod summary;
