//! amdeps: keeps AMD module dependency arrays in sync with factory parameters.
//!
//! The engine lives in `amdeps-core`; this crate is the command-line host
//! around it (configuration, terminal prompts, file IO).

// Core engine - re-exported from amdeps-core
pub use amdeps_core::buffer;
pub use amdeps_core::commands;
pub use amdeps_core::error;
pub use amdeps_core::index;
pub use amdeps_core::output;

// Host
pub mod cli;
pub mod config;
pub mod terminal;
