// src/config/mod.rs
//! Runtime configuration loaders.

pub mod advisor;

pub use advisor::{AdvisorConfig, ApiStyle};
