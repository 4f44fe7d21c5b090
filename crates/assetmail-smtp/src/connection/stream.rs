//! Implicit-TLS connection to the relay.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

use super::transport::StreamTransport;
use crate::error::{Error, Result};

/// Transport used for real deliveries: TLS from the first byte.
pub type TlsTransport = StreamTransport<TlsStream<TcpStream>>;

/// Connects to a relay over TLS (implicit TLS, usually port 465).
///
/// There is no plaintext fallback and no STARTTLS upgrade.
///
/// # Errors
///
/// Returns an error if the hostname is not a valid server name, or if the
/// TCP connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16) -> Result<TlsTransport> {
    let server_name = ServerName::try_from(hostname.to_string())?;

    let addr = format!("{hostname}:{port}");
    tracing::debug!("Connecting to {}", addr);
    let tcp_stream = TcpStream::connect(&addr).await?;

    let tls_stream = create_tls_connector()
        .connect(server_name, tcp_stream)
        .await
        .map_err(Error::Tls)?;
    tracing::debug!("TLS established with {}", hostname);

    Ok(StreamTransport::new(tls_stream))
}

/// Creates a TLS connector with the webpki root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
