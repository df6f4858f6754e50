//! # dv-core
//!
//! Core types and pure logic for the dataview review workflow.
//!
//! This crate provides the foundational types shared across all dataview crates:
//! - The static registry of reviewable tables and their correctable fields
//! - Entity records and their derived review status
//! - The edit record model (one variant per review action)
//! - Normalization of raw reviewer submissions
//! - The edit validator (pure, no storage dependency)
//! - List pagination and record navigation helpers
//! - CLI response types (apply reports, status counts)

pub mod edit;
pub mod entity;
pub mod errors;
pub mod navigation;
pub mod normalize;
pub mod responses;
pub mod status;
pub mod tables;
pub mod validate;
