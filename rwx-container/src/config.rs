use anyhow::Context;
use rwx_core::{FrameFormat, UriError, XmppUri};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// JID the container answers as
    pub jid: String,
    /// Human-readable name announced in discovery
    pub name: String,
    pub frame_format: FrameFormat,
    pub max_frame_size: usize,
    /// Requests executing at once; further requests wait for a slot
    pub max_concurrent_requests: usize,
    pub log_dir: PathBuf,
    pub log_prefix: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            jid: "rwx.localhost".to_string(),
            name: "RWX container".to_string(),
            frame_format: FrameFormat::NewlineDelimited,
            max_frame_size: 1024 * 1024,
            max_concurrent_requests: 64,
            log_dir: PathBuf::from("logs"),
            log_prefix: "rwx-container".to_string(),
        }
    }
}

impl ContainerConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.address().context("invalid jid in config")?;
        if config.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be at least 1");
        }
        Ok(config)
    }

    /// Entity URI of the container
    pub fn address(&self) -> Result<XmppUri, UriError> {
        XmppUri::entity(self.jid.as_str())
    }
}
