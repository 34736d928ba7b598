//! Chat message entities.

pub mod model;

pub use model::ChatRecord;
