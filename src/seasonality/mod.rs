//! Seasonal-trend decomposition.

mod stl;

pub use stl::{STLResult, STL};
