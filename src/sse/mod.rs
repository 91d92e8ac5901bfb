//! Server-Sent Events layer: the streaming endpoint at `/sse`.
//!
//! Each connection holds one broadcaster subscription for exactly as long
//! as its response body is alive.

pub mod connection;
pub mod frame;
pub mod handler;

pub use connection::{ConnectionState, SseConnection};
