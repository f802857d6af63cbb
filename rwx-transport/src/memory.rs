use crate::transport::{EnvelopeTransport, TransportError};
use async_trait::async_trait;
use rwx_core::Envelope;
use tokio::sync::mpsc;

const DEFAULT_CAPACITY: usize = 64;

/// In-process transport; one half of a connected pair
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Option<mpsc::Sender<Envelope>>,
    rx: mpsc::Receiver<Envelope>,
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryTransport) {
        Self::pair_with_capacity(DEFAULT_CAPACITY)
    }

    pub fn pair_with_capacity(capacity: usize) -> (MemoryTransport, MemoryTransport) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (
            MemoryTransport {
                tx: Some(a_tx),
                rx: a_rx,
            },
            MemoryTransport {
                tx: Some(b_tx),
                rx: b_rx,
            },
        )
    }
}

#[async_trait]
impl EnvelopeTransport for MemoryTransport {
    async fn send(&mut self, envelope: Envelope) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::ConnectionClosed)?;
        tx.send(envelope)
            .await
            .map_err(|_| TransportError::ConnectionClosed)
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        self.rx.close();
        Ok(())
    }
}
