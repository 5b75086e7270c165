//! Configuration loader and schema types.
//!
//! This module exposes the backend, synthesis and view settings plus the
//! helpers to load them from disk and environment.

mod load;
mod schema;

pub use schema::*;
