//! Realtime room subscriptions over websockets.

pub mod broker;
pub mod hub;
pub mod notices;
pub mod protocol;
pub mod session;
