//! Data Transfer Objects (DTOs) for the client.
//!
//! DTOs are organized by protocol:
//! - `websocket`: relay event frames
//! - `http`: auth API payloads

pub mod conversion;
pub mod http;
pub mod websocket;
