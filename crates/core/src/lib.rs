//! Domain core for the Animal Type Classification (ATC) backend.
//!
//! Holds the record model, the record filter, aggregate statistics, the
//! analysis result model and upload validation. Nothing in here performs
//! I/O beyond inspecting in-memory image bytes, so the API crate and any
//! future CLI tooling can share it.

pub mod analysis;
pub mod error;
pub mod filter;
pub mod record;
pub mod scoring;
pub mod stats;
pub mod types;
pub mod upload;
