//! Candidate notifications: payload construction and webhook dispatch.

pub mod dispatch;
pub mod message;

pub use dispatch::{
    AmateurGate, Clock, Delivery, DispatchObserver, DispatchReport, Dispatcher, Endpoint,
    Endpoints, FixedClock, SkipReason, SystemClock, TracingObserver,
};
pub use message::{NotificationMessage, SENDER_NAME};

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request to an endpoint failed before a response arrived.
    #[error("request to `{channel}` endpoint failed: {source}")]
    Transport {
        channel: String,
        #[source]
        source: reqwest::Error,
    },
}
