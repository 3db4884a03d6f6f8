//! Output models for generated files
//!
//! Builders mutate in place; rendering is pure and deterministic.

pub mod java;
pub mod xml;
