//! Utility functions shared by the scans.

pub mod stats;

pub use stats::{mean, median, quantile, std_dev, variance};
