//! Terminal front-end for Collabix.

pub mod domain;
pub mod formatter;
pub mod prompt;
pub mod runner;
pub mod terminal_editor;

pub use runner::{ClientConfig, TerminalObserver};
