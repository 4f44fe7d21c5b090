//! The narrow capability a delivery session needs from its connection.

use std::future::Future;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::framed::DEFAULT_BUFFER_SIZE;
use crate::error::Result;

/// Byte-level connection to a relay.
///
/// The session only ever sends bytes, receives chunks and closes. Anything
/// that provides those three operations can carry a conversation, which is
/// how tests script a relay without a network.
pub trait Transport {
    /// Writes all of `data` and flushes.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Waits for the next chunk of bytes. `None` means the peer closed the connection.
    fn receive(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Shuts the connection down.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// [`Transport`] over any tokio byte stream (TLS, TCP, or an in-memory pipe).
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    read_buffer: BytesMut,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<Bytes>> {
        self.read_buffer.reserve(DEFAULT_BUFFER_SIZE);
        let n = self.stream.read_buf(&mut self.read_buffer).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.read_buffer.split().freeze()))
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_returns_chunks_then_none() {
        let mock = tokio_test::io::Builder::new()
            .read(b"220 ready\r\n")
            .read(b"250 ok")
            .build();
        let mut transport = StreamTransport::new(mock);

        assert_eq!(
            transport.receive().await.unwrap().as_deref(),
            Some(&b"220 ready\r\n"[..])
        );
        assert_eq!(
            transport.receive().await.unwrap().as_deref(),
            Some(&b"250 ok"[..])
        );
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn send_writes_everything() {
        let mock = tokio_test::io::Builder::new()
            .write(b"EHLO localhost\r\n")
            .build();
        let mut transport = StreamTransport::new(mock);
        transport.send(b"EHLO localhost\r\n").await.unwrap();
    }
}
