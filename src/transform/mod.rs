//! Window transforms over cost series.

pub mod window;

pub use window::{diff, rolling_mean};
