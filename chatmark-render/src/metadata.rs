//! Message metadata side table
//!
//!     Resolution data computed once per message by the upstream enrichment step. The
//!     resolver only ever reads this table; it performs no lookups of its own. Everything
//!     derives serde so enrichment output can be carried as JSON and so test fixtures can
//!     be written inline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only resolution data for one message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default)]
    pub channels: HashMap<String, ChannelInfo>,
    #[serde(default)]
    pub roles: HashMap<String, RoleInfo>,
    #[serde(default)]
    pub users: HashMap<String, UserInfo>,
    #[serde(default)]
    pub internal_links: Vec<InternalLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
    /// Public page for the channel, when one is published.
    #[serde(default)]
    pub url: Option<String>,
    /// Whether the channel is opted into indexing. An existing channel with
    /// indexing disabled is visible but not navigable.
    #[serde(default)]
    pub indexing_enabled: bool,
    #[serde(default = "default_true")]
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
    Announcement,
    Thread,
    Forum,
    Other,
}

impl ChannelKind {
    pub fn is_thread(self) -> bool {
        matches!(self, ChannelKind::Thread)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Text => "text",
            ChannelKind::Voice => "voice",
            ChannelKind::Announcement => "announcement",
            ChannelKind::Thread => "thread",
            ChannelKind::Forum => "forum",
            ChannelKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleInfo {
    pub name: String,
    #[serde(default)]
    pub color: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Public profile page, when one exists.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub exists: bool,
}

impl UserInfo {
    /// Preferred display name: global name over username.
    pub fn display(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// One URL the enrichment step recognized as pointing back into indexed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalLink {
    /// The URL exactly as it appears in message content.
    pub original: String,
    pub guild_id: String,
    pub channel: LinkedChannel,
    /// Present when the URL addresses a specific message.
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedChannel {
    pub id: String,
    #[serde(default)]
    pub kind: ChannelKind,
    #[serde(default)]
    pub indexing_enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_json() {
        let meta: MessageMetadata = serde_json::from_str(
            r#"{
                "channels": {
                    "1": {"name": "general", "indexing_enabled": true}
                },
                "internal_links": [{
                    "original": "https://discord.com/channels/9/1/5",
                    "guild_id": "9",
                    "channel": {"id": "1", "indexing_enabled": true},
                    "message_id": "5"
                }]
            }"#,
        )
        .unwrap();
        assert!(meta.channels["1"].exists);
        assert_eq!(meta.internal_links[0].message_id.as_deref(), Some("5"));
    }
}
