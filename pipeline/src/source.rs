// Message sources
// Collaborator seam for the platforms that feed the pipeline. Sources only
// fetch and describe messages; extraction and enrichment stay in-pipeline
// so every platform goes through the same path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::Platform;
use extraction::MessageMeta;

/// One message fetched from a platform, before any processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    pub platform: Platform,
    pub channel: String,
    pub message_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn meta(&self) -> MessageMeta {
        MessageMeta {
            platform: self.platform,
            channel: self.channel.clone(),
            message_id: self.message_id.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// A platform the pipeline can poll for new messages
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Short name used in logs and failure reports
    fn name(&self) -> &str;

    /// Fetch whatever messages are pending. An empty batch is normal.
    async fn fetch_messages(&self) -> anyhow::Result<Vec<InboundMessage>>;
}

/// Fixed-content source for tests and replays
pub struct StaticSource {
    name: String,
    messages: Vec<InboundMessage>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, messages: Vec<InboundMessage>) -> Self {
        Self {
            name: name.into(),
            messages,
        }
    }
}

#[async_trait]
impl MessageSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_messages(&self) -> anyhow::Result<Vec<InboundMessage>> {
        Ok(self.messages.clone())
    }
}
