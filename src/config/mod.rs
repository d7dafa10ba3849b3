//! Configuration for tilesmith
//!
//! Provides types and loading for the optional `tilesmith.toml` project file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
