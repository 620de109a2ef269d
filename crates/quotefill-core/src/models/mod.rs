//! Data models shared across the pipeline.

pub mod config;
pub mod fields;

pub use config::QuoteFillConfig;
pub use fields::{Field, FieldSet, FormattedFieldSet, Placeholder};
