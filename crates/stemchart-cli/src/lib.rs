//! Stemchart CLI library.
//!
//! This crate hosts everything above the generation backend: the chart
//! store, the filesystem collaborators (audio metadata, MIDI files, the
//! AI engine interface), the resolution orchestrator that ties the
//! strategies together, and the command implementations for the
//! `stemchart` binary.

pub mod commands;
pub mod resolve;
pub mod response;
pub mod sources;
pub mod store;
