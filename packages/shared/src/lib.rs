//! Utilities shared by the Collabix crates: logging setup and time helpers.

pub mod logger;
pub mod time;
