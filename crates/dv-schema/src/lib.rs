//! # dv-schema
//!
//! JSON Schema registry for dataview.
//!
//! Types are defined in `dv-core` with `#[derive(JsonSchema)]`. This crate
//! collects their schemas by name, validates arbitrary JSON against them, and
//! backs the `dataview schema` export and `dataview log --check`.

pub mod error;
pub mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
