//! This module provides builders for various (Kubernetes) objects.
//!
//! They are often not _pure_ builders but contain extra logic to validate fields or to fill in
//! sensible defaults.
//!
pub mod meta;
pub mod pdb;
pub mod pod;
pub mod service;
pub mod webhook;
