//! Foundational data structures for keyword records and import results.

pub mod geometry;
pub mod models;
