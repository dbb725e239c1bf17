//! Infrastructure layer: wire formats, the relay connection, HTTP collaborators
//! and local persistence.

pub mod dto;
pub mod http;
pub mod relay;
pub mod user_store;
