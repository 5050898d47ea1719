//! Read models for CQRS-lite pattern
//!
//! This module contains view-optimized structs that provide a
//! denormalized representation of domain data for rendering.

pub mod output_document;
pub mod read_model_builder;

pub use output_document::{OutputDocument, TableView};
pub use read_model_builder::{format_size, ReadModelBuilder};
