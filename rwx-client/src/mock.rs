//! Offline stand-in for a live network, for UIs and tests.

use crate::service::{ClientError, XmppService};
use async_trait::async_trait;
use rwx_core::{CapabilityDocument, ProtocolDocument, XmppUri, TEXT_URI_LIST};
use std::path::{Path, PathBuf};
use tracing::debug;

const ITEMS: [&str; 3] = [
    "example.component.de",
    "exmaple.component.edu",
    "example.component.com",
];

const URI_LIST: &str = "xmpp://example.component.de#/path0;\
                        xmpp://example.component.com#/path0/path1;\
                        xmpp://example.component.edu#/path0/path1/path2";

/// Accepts any credentials, answers discovery with fixed items, echoes REST
/// documents and reads capability documents from JSON files under a base
/// directory (file path = URI path).
#[derive(Debug, Clone)]
pub struct MockService {
    base_dir: PathBuf,
}

impl MockService {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Capability documents are looked up under `$HOME`
    pub fn from_home() -> Self {
        let home = std::env::var_os("HOME").unwrap_or_default();
        Self::new(home)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl XmppService for MockService {
    async fn connect(&self, uri: &XmppUri, _password: &str) -> Result<(), ClientError> {
        debug!("Mock connect as {}", uri);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn discover_restful_items(&self, _uri: &XmppUri) -> Result<Vec<String>, ClientError> {
        Ok(ITEMS.iter().map(|item| item.to_string()).collect())
    }

    async fn send_rest_document(
        &self,
        _uri: &XmppUri,
        mut document: ProtocolDocument,
    ) -> Result<ProtocolDocument, ClientError> {
        if let Some(method) = document.method.as_mut() {
            method.request = None;
            if let Some(response) = method.response.as_mut() {
                if response.media_type == TEXT_URI_LIST {
                    response.representation = Some(URI_LIST.to_string());
                }
            }
        }
        Ok(document)
    }

    async fn get_xwadl_document(&self, uri: &XmppUri) -> Result<CapabilityDocument, ClientError> {
        let path = self.base_dir.join(uri.path().trim_start_matches('/'));
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ClientError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ClientError::Document { path, source })
    }
}
