use crate::codec::EnvelopeCodec;
use crate::transport::{EnvelopeTransport, TransportError};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use rwx_core::Envelope;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};

/// Envelopes framed over a pair of byte streams (socket halves, stdio, ...)
#[derive(Debug)]
pub struct FramedTransport<R, W> {
    reader: FramedRead<R, EnvelopeCodec>,
    writer: FramedWrite<W, EnvelopeCodec>,
}

impl<R, W> FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, codec: EnvelopeCodec) -> Self {
        Self {
            reader: FramedRead::new(reader, codec.clone()),
            writer: FramedWrite::new(writer, codec),
        }
    }
}

#[async_trait]
impl<R, W> EnvelopeTransport for FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, envelope: Envelope) -> Result<(), TransportError> {
        tracing::trace!(id = %envelope.id, kind = %envelope.kind, "Envelope sent");
        self.writer.send(envelope).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        match self.reader.next().await {
            Some(Ok(envelope)) => {
                tracing::trace!(id = %envelope.id, kind = %envelope.kind, "Envelope received");
                Ok(Some(envelope))
            }
            Some(Err(e)) => Err(e.into()),
            None => {
                tracing::debug!("Input stream ended");
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.close().await?;
        tracing::debug!("Framed transport closed");
        Ok(())
    }
}
