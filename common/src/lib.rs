//! Browser-independent core of the loader: sources, mapping, payloads and
//! job tracking. The `frontend` crate renders it; everything here runs and
//! is tested natively.

pub mod config;
pub mod csv;
pub mod display;
pub mod error;
pub mod jobs;
pub mod mapping;
pub mod model;
pub mod payload;
pub mod preview;
pub mod requests;
pub mod session;
pub mod source;
