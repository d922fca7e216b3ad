//! Domain layer
pub mod aggregates;
