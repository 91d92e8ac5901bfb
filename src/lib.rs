//! # chat-relay
//!
//! Minimal broadcast relay. Short text messages submitted with
//! `GET /chat?message=...` are pushed to every client currently connected
//! to the Server-Sent Events stream at `GET /sse`.
//!
//! Delivery is best-effort and ephemeral: only listeners connected at the
//! moment of publication receive a message, and nothing is stored.
//!
//! ## Architecture
//!
//! ```text
//! Clients (browser EventSource, fetch)
//!     │
//!     ├── HTTP Handlers (api/)      GET /chat, GET /health, static assets
//!     ├── SSE Handler (sse/)        GET /sse, one subscription per connection
//!     │
//!     ├── RelayService (service/)
//!     │
//!     └── Broadcaster (domain/)     in-process publish/subscribe hub
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod shutdown;
pub mod sse;
