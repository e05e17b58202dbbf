//! Example: send a `welcome` notification, then fire one off best-effort.
//!
//! # Usage
//!
//! ```bash
//! export SENDIVENT_API_KEY="test_your_api_key"
//! cargo run --example send_welcome
//! ```

use sendivent::{Client, Contact, SendRequest};

#[tokio::main]
async fn main() -> Result<(), sendivent::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let api_key =
        std::env::var("SENDIVENT_API_KEY").unwrap_or_else(|_| "test_your_api_key".to_owned());
    let client = Client::new(api_key)?;
    tracing::info!(environment = ?client.environment(), "client ready");

    // Wait for the delivery-queue acknowledgement.
    let request = SendRequest::new()
        .event("welcome")
        .to("user@example.com")
        .payload(serde_json::json!({ "name": "Jane", "company": "Acme Corp" }))
        .language("en")
        .idempotency_key("signup-1234");

    let response = client.send(&request).await?;
    if response.is_success() {
        tracing::info!(queue_ids = ?response.data, "notification queued");
    } else {
        tracing::warn!(error = ?response.error, "service rejected the send");
    }

    // Structured contact, forced channel, provider override.
    let request = SendRequest::new()
        .event("welcome")
        .channel("email")
        .to(Contact {
            email: Some("user@example.com".to_owned()),
            name: Some("Jane".to_owned()),
            ..Contact::default()
        })
        .overrides(serde_json::json!({ "email": { "subject": "Welcome aboard!" } }));

    // Fire-and-forget: returns once the request bytes are on the wire (or
    // the attempt failed); the outcome is deliberately unknown.
    client.send_best_effort(&request).await?;
    tracing::info!("best-effort notification dispatched");

    Ok(())
}
