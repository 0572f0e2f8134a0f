//! Utility modules: id generation, JSON normalization.

pub mod ids;
pub mod json;

pub use ids::{IdGenerator, SequentialIds, UuidIds};
