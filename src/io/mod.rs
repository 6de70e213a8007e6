//! Exporting samples to disk. Each format lives behind its own Cargo feature.

#[cfg(feature = "csv")]
pub mod csv;
