//! Service layer: request-facing orchestration.
//!
//! [`RelayService`] applies the submission policy and forwards messages
//! to the [`super::domain::Broadcaster`].

pub mod relay_service;

pub use relay_service::RelayService;
