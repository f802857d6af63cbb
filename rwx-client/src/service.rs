use async_trait::async_trait;
use rwx_core::{CapabilityDocument, DispatchError, ProtocolDocument, XmppUri};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("No reply to {id} within {after:?}")]
    Timeout { id: String, after: Duration },

    #[error("Remote error: {0}")]
    Remote(DispatchError),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse capability document {path:?}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Client-side view of an RWX network
#[async_trait]
pub trait XmppService: Send + Sync {
    /// Authenticate as `uri` (a bare JID, path ignored)
    async fn connect(&self, uri: &XmppUri, password: &str) -> Result<(), ClientError>;

    async fn disconnect(&self) -> Result<(), ClientError>;

    /// Addresses of the items found under `uri`
    async fn discover_restful_items(&self, uri: &XmppUri) -> Result<Vec<String>, ClientError>;

    /// Send a REST document to the entity of `uri` and wait for the answer
    async fn send_rest_document(
        &self,
        uri: &XmppUri,
        document: ProtocolDocument,
    ) -> Result<ProtocolDocument, ClientError>;

    /// Capability document of the resource `uri` points at
    async fn get_xwadl_document(&self, uri: &XmppUri) -> Result<CapabilityDocument, ClientError>;
}
