//! Data Transfer Objects for request parsing and response serialization.

pub mod chat_dto;
pub mod system_dto;

pub use chat_dto::*;
pub use system_dto::*;
