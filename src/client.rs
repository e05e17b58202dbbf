use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use snafu::ResultExt;

use crate::{
    api_key::{ApiKey, Environment},
    error::{DecodeResponseSnafu, InitializeClientSnafu, RequestSnafu, Result},
    raw,
    request::SendRequest,
    response::SendResponse,
    NotificationSender,
};

pub(crate) const USER_AGENT: &str = concat!("Sendivent-Rust/", env!("CARGO_PKG_VERSION"));
pub(crate) const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Sendivent notification API.
///
/// The API key prefix picks the environment at construction and the mapping
/// stays fixed for the client's lifetime. One attempt per send, no retries;
/// callers that want retry semantics layer them on top.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
}

impl Client {
    /// Creates a client from an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key prefix is not `test_` or `live_`, or if
    /// the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_api_key(ApiKey::new(api_key)?)
    }

    /// Creates a client from an already validated [`ApiKey`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_api_key(api_key: ApiKey) -> Result<Self> {
        let base_url = api_key.environment().base_url().to_owned();
        Self::with_base_url(api_key, base_url)
    }

    pub(crate) fn with_base_url(api_key: ApiKey, base_url: String) -> Result<Self> {
        let mut authorization =
            HeaderValue::try_from(format!("Bearer {}", api_key.as_str())).map_err(|_| {
                InitializeClientSnafu {
                    message: "API key contains characters not allowed in a header",
                }
                .build()
            })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| InitializeClientSnafu { message: error.to_string() }.build())?;

        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// The environment this client targets.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.api_key.environment()
    }

    /// Sends the notification and waits for the delivery-queue
    /// acknowledgement.
    ///
    /// Issues a single `POST {base}/send/{event}[/{channel}]` with the
    /// request's JSON body; a non-2xx status or any transport failure is a
    /// request error. No retries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEvent`](crate::Error::MissingEvent) before
    /// any network activity if no event name is set,
    /// [`Error::Request`](crate::Error::Request) on transport or protocol
    /// failure, [`Error::DecodeResponse`](crate::Error::DecodeResponse) if
    /// the response body is not a valid send response.
    pub async fn send(&self, request: &SendRequest) -> Result<SendResponse> {
        let built = request.build()?;
        let url = format!("{}/{}", self.base_url, built.path);

        let mut http_request = self.http.post(&url).json(&built.body);
        if let Some(key) = &built.idempotency_key {
            http_request = http_request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let response = http_request
            .send()
            .await
            .context(RequestSnafu)?
            .error_for_status()
            .context(RequestSnafu)?;
        let response: SendResponse = response.json().await.context(DecodeResponseSnafu)?;

        tracing::debug!(path = %built.path, success = response.success, "send acknowledged");
        Ok(response)
    }

    /// Dispatches the notification fire-and-forget.
    ///
    /// Opens a raw connection, writes the complete request and closes it
    /// without reading a response. Connect, TLS and write failures are
    /// swallowed by design; use [`send`](Self::send) when the outcome
    /// matters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEvent`](crate::Error::MissingEvent) (before
    /// any network activity) if no event name is set. Nothing else.
    pub async fn send_best_effort(&self, request: &SendRequest) -> Result<()> {
        let built = request.build()?;
        raw::dispatch(&self.base_url, self.api_key.as_str(), &built).await;
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for Client {
    async fn send(&self, request: &SendRequest) -> Result<SendResponse> {
        Self::send(self, request).await
    }

    async fn send_best_effort(&self, request: &SendRequest) -> Result<()> {
        Self::send_best_effort(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{io::AsyncWriteExt, net::TcpListener, task::JoinHandle};

    use super::*;
    use crate::{test_support::read_http_request, Error};

    fn test_client(base_url: String) -> Client {
        Client::with_base_url(ApiKey::new("test_key").unwrap(), base_url).unwrap()
    }

    /// One-shot mock API: answers the first request with the given status
    /// line and JSON body, returning what it read.
    async fn mock_api(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_http_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: \
                 {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn client_accepts_prevalidated_key() {
        let client = Client::with_api_key(ApiKey::new("live_abc123").unwrap()).unwrap();
        assert_eq!(client.environment(), Environment::Production);
    }

    #[tokio::test]
    async fn send_maps_success_response() {
        let (base_url, server) =
            mock_api("200 OK", r#"{"success":true,"deliveries":["q1"]}"#).await;
        let client = test_client(base_url);

        let request = SendRequest::new()
            .event("welcome")
            .channel("sms")
            .to("user@example.com")
            .payload(json!({ "name": "Jane" }))
            .idempotency_key("order-42");
        let response = client.send(&request).await.unwrap();

        assert!(response.is_success());
        assert!(!response.has_error());
        assert_eq!(response.data, Some(vec![json!("q1")]));

        let received = server.await.unwrap().to_lowercase();
        assert!(received.starts_with("post /send/welcome/sms http/1.1\r\n"));
        assert!(received.contains("authorization: bearer test_key"));
        assert!(received.contains("content-type: application/json"));
        assert!(received.contains("x-idempotency-key: order-42"));
        assert!(received.contains(r#""to":"user@example.com""#));
    }

    #[tokio::test]
    async fn send_maps_error_response() {
        let (base_url, server) = mock_api("200 OK", r#"{"success":false,"error":"bad request"}"#).await;
        let client = test_client(base_url);

        let request = SendRequest::new().event("welcome");
        let response = client.send(&request).await.unwrap();

        assert!(!response.is_success());
        assert!(response.has_error());
        assert_eq!(response.error.as_deref(), Some("bad request"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_a_request_error() {
        let (base_url, server) = mock_api("400 Bad Request", r#"{"success":false}"#).await;
        let client = test_client(base_url);

        let result = client.send(&SendRequest::new().event("welcome")).await;
        assert!(matches!(result, Err(Error::Request { .. })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn missing_event_fails_both_paths_before_any_network_use() {
        // Nothing listens on this address; a network attempt would error out
        // differently (or hang) rather than report the missing event.
        let client = test_client("http://127.0.0.1:9".to_owned());
        let request = SendRequest::new().to("user@example.com");

        assert!(matches!(client.send(&request).await, Err(Error::MissingEvent)));
        assert!(matches!(client.send_best_effort(&request).await, Err(Error::MissingEvent)));
    }

    #[tokio::test]
    async fn best_effort_send_reaches_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await
        });

        let client = test_client(format!("http://{addr}"));
        let request = SendRequest::new().event("welcome").to("user@example.com");
        client.send_best_effort(&request).await.unwrap();

        let received = server.await.unwrap();
        assert!(received.starts_with("POST /send/welcome HTTP/1.1\r\n"));
        assert!(received.contains("Connection: close\r\n"));
    }
}
