//! CLI command implementations

pub mod resolve;
pub mod store;
pub mod synth;
