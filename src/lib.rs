//! # Sendivent Rust SDK
//!
//! Client SDK for the Sendivent multi-channel notification delivery API
//! (email, SMS, chat, push). A notification is dispatched for a named event
//! configured server-side; the service resolves templates, channels and
//! routing on its end.
//!
//! The API key prefix selects the environment: `test_*` keys talk to the
//! sandbox, `live_*` keys to production.
//!
//! ## Example
//!
//! ```no_run
//! use sendivent::{Client, SendRequest};
//!
//! # async fn example() -> Result<(), sendivent::Error> {
//! let client = Client::new("test_your_api_key")?;
//!
//! let request = SendRequest::new()
//!     .event("welcome")
//!     .to("user@example.com")
//!     .payload(serde_json::json!({ "name": "Jane" }));
//!
//! let response = client.send(&request).await?;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! When the outcome does not matter, [`Client::send_best_effort`] dispatches
//! the same request without waiting for (or reading) a response.

mod api_key;
mod client;
mod error;
mod raw;
mod recipient;
mod request;
mod response;
#[cfg(test)]
mod test_support;

use async_trait::async_trait;

pub use api_key::{ApiKey, Environment};
pub use client::Client;
pub use error::{Error, Result};
pub use recipient::{Contact, Recipient, Recipients};
pub use request::SendRequest;
pub use response::SendResponse;

/// Capability to dispatch a notification request, with the two delivery
/// contracts picked explicitly by the caller.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends the notification and waits for the delivery-queue
    /// acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not fully configured or the HTTP
    /// call fails.
    async fn send(&self, request: &SendRequest) -> Result<SendResponse>;

    /// Dispatches the notification best-effort, without waiting for or
    /// reading any response. Transport failures are swallowed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request is not fully configured; nothing
    /// network-related is ever surfaced.
    async fn send_best_effort(&self, request: &SendRequest) -> Result<()>;
}
