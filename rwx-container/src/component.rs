//! Serves a container over an envelope transport.

use crate::container::ResourceContainer;
use rwx_core::{Body, DispatchError, Envelope, StanzaType};
use rwx_transport::{EnvelopeTransport, TransportError};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

/// Answers `get`/`set` envelopes addressed to one container. Each request
/// runs in its own task; dispatch itself goes to the blocking pool since
/// resource operations may block.
#[derive(Debug, Clone)]
pub struct ResourceComponent {
    container: ResourceContainer,
    limit: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ResourceComponent {
    pub fn new(container: ResourceContainer, max_concurrent_requests: usize) -> Self {
        let max_concurrent = max_concurrent_requests.max(1);
        Self {
            container,
            limit: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn container(&self) -> &ResourceContainer {
        &self.container
    }

    /// Reply to one envelope. `None` when the envelope is not a request.
    pub async fn handle(&self, envelope: Envelope) -> Option<Envelope> {
        if envelope.kind.is_response() {
            warn!(
                "Ignoring unsolicited {} stanza {} from {:?}",
                envelope.kind, envelope.id, envelope.from
            );
            return None;
        }

        let outcome = match Arc::clone(&self.limit).acquire_owned().await {
            Ok(permit) => {
                let container = self.container.clone();
                let kind = envelope.kind;
                let body = envelope.body.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    answer(&container, kind, body)
                })
                .await;
                joined.unwrap_or_else(|e| {
                    error!("Request {} aborted: {}", envelope.id, e);
                    Err(DispatchError::internal(format!("request aborted: {}", e)))
                })
            }
            Err(_) => Err(DispatchError::internal("component is shutting down")),
        };

        let reply = match outcome {
            Ok(body) => Envelope::result_for(&envelope, body),
            Err(e) => {
                debug!("Request {} failed: {}", envelope.id, e);
                Envelope::error_for(&envelope, e)
            }
        };
        reply
            .inspect_err(|e| warn!("Cannot answer {}: {}", envelope.id, e))
            .ok()
    }

    /// Read requests until the peer goes away, answering each concurrently.
    /// Replies still in flight when the peer closes are flushed before
    /// returning.
    pub async fn serve<T: EnvelopeTransport>(&self, mut transport: T) -> Result<(), TransportError> {
        info!(
            "Serving {} (up to {} concurrent requests)",
            self.container.address(),
            self.max_concurrent
        );
        let (reply_tx, mut reply_rx) = mpsc::channel::<Envelope>(self.max_concurrent);
        let mut failure = None;

        loop {
            tokio::select! {
                incoming = transport.recv() => match incoming {
                    Ok(Some(envelope)) => {
                        debug!("Received {} stanza {}", envelope.kind, envelope.id);
                        let component = self.clone();
                        let replies = reply_tx.clone();
                        tokio::spawn(async move {
                            if let Some(reply) = component.handle(envelope).await {
                                let _ = replies.send(reply).await;
                            }
                        });
                    }
                    Ok(None) => {
                        info!("Peer closed the connection");
                        break;
                    }
                    Err(e) => {
                        error!("Transport failed: {}", e);
                        failure = Some(e);
                        break;
                    }
                },
                Some(reply) = reply_rx.recv() => {
                    transport.send(reply).await?;
                }
            }
        }

        drop(reply_tx);
        while let Some(reply) = reply_rx.recv().await {
            if let Err(e) = transport.send(reply).await {
                warn!("Dropping pending replies: {}", e);
                break;
            }
        }
        if let Err(e) = transport.close().await {
            debug!("Close after serve: {}", e);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn answer(container: &ResourceContainer, kind: StanzaType, body: Body) -> Result<Body, DispatchError> {
    match (kind, body) {
        (StanzaType::Set, Body::Rest(document)) => container.dispatch(document).map(Body::Rest),
        (StanzaType::Get, Body::XwadlQuery { path }) => {
            container.describe_capabilities(&path).map(Body::Xwadl)
        }
        (StanzaType::Get, Body::DiscoItemsQuery { path }) => {
            container.discover_items(&path).map(Body::DiscoItems)
        }
        (kind, body) => Err(DispatchError::invalid_document(format!(
            "Cannot answer a '{}' stanza carrying {}",
            kind,
            body_kind(&body)
        ))),
    }
}

fn body_kind(body: &Body) -> &'static str {
    match body {
        Body::Rest(_) => "a REST document",
        Body::XwadlQuery { .. } => "a capability query",
        Body::Xwadl(_) => "a capability document",
        Body::DiscoItemsQuery { .. } => "a discovery query",
        Body::DiscoItems(_) => "discovery items",
        Body::Error(_) => "an error",
        Body::Empty => "no body",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;
    use crate::namespace::ResourceTree;
    use crate::operations::{Operations, Resource};
    use rwx_core::{ErrorCode, IdGenerator, MethodInvocation, ProtocolDocument, XmppUri};
    use serde_json::json;

    struct Clock;

    impl Resource for Clock {
        fn operations(ops: &mut Operations<Self>) {
            ops.method(MethodDescriptor::new("get").produces("text/plain"), |_, _| {
                Ok(Some(json!("12:00")))
            });
        }
    }

    fn component() -> ResourceComponent {
        let tree = Arc::new(ResourceTree::new());
        tree.insert("/clock", Arc::new(Clock)).unwrap();
        let container =
            ResourceContainer::builder(XmppUri::entity("clock.example.org").unwrap(), tree).build();
        ResourceComponent::new(container, 4)
    }

    #[tokio::test]
    async fn test_set_dispatches_rest_document() {
        let ids = IdGenerator::with_prefix(1);
        let request = Envelope::request(
            &ids,
            StanzaType::Set,
            "clock.example.org",
            Body::Rest(ProtocolDocument::method(
                "/clock",
                MethodInvocation::new("get").accepting("text/plain"),
            )),
        )
        .from_address("user@example.org");

        let reply = component().handle(request.clone()).await.unwrap();
        assert_eq!(reply.id, request.id);
        assert_eq!(reply.kind, StanzaType::Result);
        assert_eq!(reply.to.as_deref(), Some("user@example.org"));
        match reply.body {
            Body::Rest(doc) => assert_eq!(
                doc.method.unwrap().response_representation(),
                Some("12:00")
            ),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_stanza_type_is_an_error_reply() {
        let ids = IdGenerator::with_prefix(2);
        let request = Envelope::request(
            &ids,
            StanzaType::Set,
            "clock.example.org",
            Body::XwadlQuery {
                path: "/clock".into(),
            },
        );
        let reply = component().handle(request).await.unwrap();
        assert_eq!(reply.kind, StanzaType::Error);
        assert!(matches!(
            reply.body,
            Body::Error(DispatchError {
                code: ErrorCode::InvalidDocument,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_responses_are_ignored() {
        let ids = IdGenerator::with_prefix(3);
        let mut stray = Envelope::request(&ids, StanzaType::Get, "clock.example.org", Body::Empty);
        stray.kind = StanzaType::Result;
        assert!(component().handle(stray).await.is_none());
    }
}
