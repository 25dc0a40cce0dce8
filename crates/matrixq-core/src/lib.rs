//! matrixq-core: matrix question model, response codec and grading engine.
//!
//! This crate defines the grid data model, the flat response field scheme,
//! the single- and multiple-choice grading strategies and the collaborator
//! layers (store, authoring validation, import/export) the CLI builds on.

pub mod attempt;
pub mod codec;
pub mod config;
pub mod error;
pub mod feedback;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod store;
pub mod validation;

#[cfg(test)]
mod fixtures;
