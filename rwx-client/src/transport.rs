use crate::service::{ClientError, XmppService};
use async_trait::async_trait;
use dashmap::DashMap;
use rwx_core::{
    Body, CapabilityDocument, Envelope, IdGenerator, ProtocolDocument, StanzaType, XmppUri,
};
use rwx_transport::EnvelopeTransport;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type Pending = Arc<DashMap<String, oneshot::Sender<Envelope>>>;

#[derive(Debug)]
enum Command {
    Send(Envelope),
    Close,
}

/// [`XmppService`] over an envelope transport. A background task owns the
/// transport; replies are matched to requests by envelope id.
#[derive(Debug)]
pub struct TransportService {
    ids: IdGenerator,
    local: RwLock<Option<String>>,
    commands: mpsc::Sender<Command>,
    pending: Pending,
    request_timeout: Duration,
}

impl TransportService {
    /// Must be called inside a tokio runtime
    pub fn new<T>(transport: T) -> Self
    where
        T: EnvelopeTransport + 'static,
    {
        Self::with_ids(transport, IdGenerator::new())
    }

    pub fn with_ids<T>(transport: T, ids: IdGenerator) -> Self
    where
        T: EnvelopeTransport + 'static,
    {
        let (commands, rx) = mpsc::channel(64);
        let pending: Pending = Arc::new(DashMap::new());
        tokio::spawn(drive(transport, rx, Arc::clone(&pending)));
        Self {
            ids,
            local: RwLock::new(None),
            commands,
            pending,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Requests waiting for a reply
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    async fn request(&self, kind: StanzaType, to: &str, body: Body) -> Result<Body, ClientError> {
        let from = self
            .local
            .read()
            .ok()
            .and_then(|local| local.clone())
            .ok_or(ClientError::NotConnected)?;

        let envelope = Envelope::request(&self.ids, kind, to, body).from_address(from);
        let id = envelope.id.clone();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), tx);
        // removes the waiter on every exit, including a dropped future
        let _waiting = Waiting {
            pending: &self.pending,
            id: &id,
        };

        if self.commands.send(Command::Send(envelope)).await.is_err() {
            return Err(ClientError::ConnectionClosed);
        }
        debug!("Sent {} request {} to {}", kind, id, to);

        let reply = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(ClientError::ConnectionClosed),
            Err(_) => {
                return Err(ClientError::Timeout {
                    id: id.clone(),
                    after: self.request_timeout,
                });
            }
        };

        match (reply.kind, reply.body) {
            (StanzaType::Error, Body::Error(e)) => Err(ClientError::Remote(e)),
            (StanzaType::Result, body) => Ok(body),
            (reply_kind, _) => Err(ClientError::UnexpectedReply(format!(
                "{} answered with a '{}' stanza",
                id, reply_kind
            ))),
        }
    }
}

struct Waiting<'a> {
    pending: &'a Pending,
    id: &'a str,
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.id);
    }
}

#[async_trait]
impl XmppService for TransportService {
    async fn connect(&self, uri: &XmppUri, _password: &str) -> Result<(), ClientError> {
        // the transport is authenticated when it is established
        if let Ok(mut local) = self.local.write() {
            *local = Some(uri.jid().to_string());
        }
        info!("Connected as {}", uri.jid());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        if let Ok(mut local) = self.local.write() {
            *local = None;
        }
        let _ = self.commands.send(Command::Close).await;
        Ok(())
    }

    async fn discover_restful_items(&self, uri: &XmppUri) -> Result<Vec<String>, ClientError> {
        let path = query_path(uri);
        match self
            .request(StanzaType::Get, uri.jid(), Body::DiscoItemsQuery { path })
            .await?
        {
            Body::DiscoItems(items) => Ok(items.addresses().map(str::to_string).collect()),
            other => Err(unexpected(other, "discovery items")),
        }
    }

    async fn send_rest_document(
        &self,
        uri: &XmppUri,
        document: ProtocolDocument,
    ) -> Result<ProtocolDocument, ClientError> {
        match self
            .request(StanzaType::Set, uri.jid(), Body::Rest(document))
            .await?
        {
            Body::Rest(document) => Ok(document),
            other => Err(unexpected(other, "a REST document")),
        }
    }

    async fn get_xwadl_document(&self, uri: &XmppUri) -> Result<CapabilityDocument, ClientError> {
        let path = query_path(uri);
        match self
            .request(StanzaType::Get, uri.jid(), Body::XwadlQuery { path })
            .await?
        {
            Body::Xwadl(document) => Ok(document),
            other => Err(unexpected(other, "a capability document")),
        }
    }
}

fn query_path(uri: &XmppUri) -> String {
    if uri.path().is_empty() {
        "/".to_string()
    } else {
        uri.path().to_string()
    }
}

fn unexpected(body: Body, wanted: &str) -> ClientError {
    ClientError::UnexpectedReply(format!("expected {}, got {:?}", wanted, body))
}

async fn drive<T: EnvelopeTransport>(
    mut transport: T,
    mut commands: mpsc::Receiver<Command>,
    pending: Pending,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(envelope)) => {
                    let id = envelope.id.clone();
                    if let Err(e) = transport.send(envelope).await {
                        error!("Sending {} failed: {}", id, e);
                        pending.remove(&id);
                        break;
                    }
                }
                Some(Command::Close) | None => break,
            },
            incoming = transport.recv() => match incoming {
                Ok(Some(envelope)) if envelope.kind.is_response() => {
                    match pending.remove(&envelope.id) {
                        Some((_, waiter)) => {
                            let _ = waiter.send(envelope);
                        }
                        None => warn!("Dropping reply {} nobody waits for", envelope.id),
                    }
                }
                Ok(Some(envelope)) => {
                    warn!("Ignoring {} request {} sent to a client", envelope.kind, envelope.id);
                }
                Ok(None) => {
                    info!("Peer closed the connection");
                    break;
                }
                Err(e) => {
                    error!("Transport failed: {}", e);
                    break;
                }
            },
        }
    }

    // refuse new requests before failing the waiting ones
    commands.close();
    pending.clear();
    if let Err(e) = transport.close().await {
        debug!("Close: {}", e);
    }
}
