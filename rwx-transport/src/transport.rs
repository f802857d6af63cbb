use crate::codec::CodecError;
use async_trait::async_trait;
use rwx_core::Envelope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Moves envelopes between two entities. Delivery guarantees, addressing
/// and connection lifecycle belong to the implementation.
#[async_trait]
pub trait EnvelopeTransport: Send {
    async fn send(&mut self, envelope: Envelope) -> Result<(), TransportError>;

    /// `Ok(None)` once the peer has gone away. Must be cancel-safe.
    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}
