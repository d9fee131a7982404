//! Core engine for amdeps.
//!
//! Keeps the dependency header of AMD-style JavaScript modules in sync with
//! the factory function's parameters:
//! - Dependency index built from project roots (`index`, `store`)
//! - Structural location of the coupled path array / parameter list (`locator`)
//! - Interactive resolution of ambiguous names (`resolver`, `interaction`)
//! - Region editing and sorting over an abstract text buffer (`editor`,
//!   `sorter`, `buffer`)
//! - Host-facing commands composed from the above (`commands`)
//! - Error types, JSON output types and diff previews
//!
//! The engine never touches files it edits: hosts load text into a
//! [`buffer::TextBuffer`], run a command, and decide what to persist.

pub mod buffer;
pub mod commands;
pub mod diff;
pub mod editor;
pub mod error;
pub mod index;
pub mod interaction;
pub mod locator;
pub mod output;
pub mod patch;
pub mod resolver;
pub mod sorter;
pub mod store;
pub mod text;
