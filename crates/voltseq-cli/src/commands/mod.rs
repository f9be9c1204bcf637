//! CLI command implementations.

pub mod common;
pub mod envelope;
pub mod euclid;
pub mod presets;
pub mod quantize;
pub mod simulate;
pub mod validate;
