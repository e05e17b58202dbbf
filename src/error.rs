use snafu::Snafu;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the Sendivent SDK.
///
/// Configuration errors (`InvalidApiKey`, `MissingEvent`, `InitializeClient`)
/// are raised locally before any I/O. `Request` wraps a transport or protocol
/// level failure of the synchronous send path; the best-effort path never
/// produces it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The API key does not carry a recognized environment prefix.
    #[snafu(display("API key must start with `test_` or `live_`"))]
    InvalidApiKey,

    /// A send was attempted before an event name was set.
    #[snafu(display("Event name must be set before sending"))]
    MissingEvent,

    /// The underlying HTTP client could not be constructed.
    #[snafu(display("Failed to initialize HTTP client: {message}"))]
    InitializeClient { message: String },

    /// The request body could not be serialized to JSON.
    #[snafu(display("Failed to encode request body: {source}"))]
    EncodeBody { source: serde_json::Error },

    /// The synchronous HTTP call failed at the network or protocol level.
    #[snafu(display("Sendivent API request failed: {source}"))]
    Request { source: reqwest::Error },

    /// The API answered with a body that is not a valid send response.
    #[snafu(display("Failed to decode API response: {source}"))]
    DecodeResponse { source: reqwest::Error },
}
