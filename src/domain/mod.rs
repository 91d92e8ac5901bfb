//! Domain layer: message type, subscription identity, and the broadcaster.
//!
//! Everything here is transport-agnostic. The HTTP and SSE layers depend on
//! this module, never the other way round.

pub mod broadcaster;
pub mod message;
pub mod subscription_id;

pub use broadcaster::{
    Broadcaster, DeliveryError, PublishReport, SubscriptionGuard, SubscriptionHandle,
};
pub use message::Message;
pub use subscription_id::SubscriptionId;
