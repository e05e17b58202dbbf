//! Best-effort dispatch over a raw connection.
//!
//! Writes one complete HTTP/1.1 request onto a fresh TCP (or TLS) connection
//! and closes it without reading a single response byte. Every failure on
//! this path is logged at debug level and otherwise discarded: the caller
//! has opted out of knowing the outcome.

use std::{sync::Arc, time::Duration};

use reqwest::Url;
use snafu::{OptionExt, ResultExt, Snafu};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::{
    rustls::{self, pki_types::ServerName},
    TlsConnector,
};

use crate::{
    client::{IDEMPOTENCY_KEY_HEADER, USER_AGENT},
    request::BuiltRequest,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Writes the request to `{base_url}/{path}` and returns once the bytes are
/// flushed (or the attempt failed). Never surfaces an error.
pub(crate) async fn dispatch(base_url: &str, api_key: &str, request: &BuiltRequest) {
    match tokio::time::timeout(DISPATCH_TIMEOUT, try_dispatch(base_url, api_key, request)).await {
        Ok(Ok(())) => {
            tracing::debug!(path = %request.path, "best-effort request dispatched");
        }
        Ok(Err(error)) => {
            tracing::debug!(path = %request.path, %error, "best-effort dispatch failed");
        }
        Err(_) => {
            tracing::debug!(path = %request.path, "best-effort dispatch timed out");
        }
    }
}

#[derive(Debug, Snafu)]
enum DispatchError {
    #[snafu(display("invalid endpoint `{url}`"))]
    InvalidEndpoint { url: String },

    #[snafu(display("failed to encode request body: {source}"))]
    EncodeBody { source: serde_json::Error },

    #[snafu(display("connect timed out"))]
    ConnectTimeout,

    #[snafu(display("connect failed: {source}"))]
    Connect { source: std::io::Error },

    #[snafu(display("TLS configuration rejected: {source}"))]
    TlsConfig { source: rustls::Error },

    #[snafu(display("`{host}` is not a valid TLS server name"))]
    InvalidServerName { host: String },

    #[snafu(display("TLS handshake failed: {source}"))]
    Handshake { source: std::io::Error },

    #[snafu(display("write failed: {source}"))]
    Write { source: std::io::Error },
}

async fn try_dispatch(
    base_url: &str,
    api_key: &str,
    request: &BuiltRequest,
) -> Result<(), DispatchError> {
    let url = Url::parse(base_url).ok().context(InvalidEndpointSnafu { url: base_url })?;
    let host = url.host_str().context(InvalidEndpointSnafu { url: base_url })?.to_owned();
    let port = url.port_or_known_default().context(InvalidEndpointSnafu { url: base_url })?;

    // Url::port() is None for the scheme default, which is exactly when the
    // Host header must not carry a port.
    let host_header = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.clone(),
    };

    let body = serde_json::to_vec(&request.body).context(EncodeBodySnafu)?;
    let payload = encode_request(
        &host_header,
        &request.path,
        api_key,
        request.idempotency_key.as_deref(),
        &body,
    );

    let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
        .await
        .ok()
        .context(ConnectTimeoutSnafu)?
        .context(ConnectSnafu)?;

    if url.scheme() == "https" {
        let connector = tls_connector()?;
        let server_name = ServerName::try_from(host.clone())
            .ok()
            .context(InvalidServerNameSnafu { host })?;
        let stream = connector.connect(server_name, stream).await.context(HandshakeSnafu)?;
        write_and_close(stream, &payload).await
    } else {
        write_and_close(stream, &payload).await
    }
}

/// Builds the TLS client configuration with an explicit crypto provider, so
/// the choice cannot collide with whatever provider the HTTP client linked.
fn tls_connector() -> Result<TlsConnector, DispatchError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context(TlsConfigSnafu)?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Serializes a complete HTTP/1.1 request: request line, headers,
/// `Content-Length`, `Connection: close`, then the JSON body.
fn encode_request(
    host_header: &str,
    path: &str,
    api_key: &str,
    idempotency_key: Option<&str>,
    body: &[u8],
) -> Vec<u8> {
    let mut head = String::with_capacity(256 + body.len());
    head.push_str(&format!("POST /{path} HTTP/1.1\r\n"));
    head.push_str(&format!("Host: {host_header}\r\n"));
    head.push_str(&format!("Authorization: Bearer {api_key}\r\n"));
    head.push_str("Content-Type: application/json\r\n");
    head.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
    if let Some(key) = idempotency_key {
        head.push_str(&format!("{IDEMPOTENCY_KEY_HEADER}: {key}\r\n"));
    }
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("Connection: close\r\n\r\n");

    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

async fn write_and_close<S>(mut stream: S, payload: &[u8]) -> Result<(), DispatchError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(payload).await.context(WriteSnafu)?;
    // The request must be fully flushed before the connection closes;
    // closing with bytes still buffered would truncate it.
    stream.flush().await.context(WriteSnafu)?;
    let _ = stream.shutdown().await;
    Ok(())
}
