//! Semantic resolution
//!
//!     Pure tree-to-tree pass from the parsed AST to a resolved AST: mentions and links are
//!     classified against the metadata side table, guild emoji get their CDN delivery URL,
//!     and emoji sizing is fixed from sibling context. A miss is never an error here; it is
//!     a first-class render state (`Unknown` / `NoAccess`) that the builder turns into its
//!     own node shape.
//!
//!     Resolution is a function of `(node, metadata)` only: no I/O, no mutation, no
//!     ambient state.

use serde::{Deserialize, Serialize};

use chatmark_parser::{MentionKind, Node};

use crate::metadata::{ChannelKind, MessageMetadata};

/// Pinned twemoji asset release; mismatches against newer emoji are cosmetic.
const TWEMOJI_BASE: &str = "https://cdn.jsdelivr.net/gh/jdecked/twemoji@15.1.0/assets/svg";

const EMOJI_CDN: &str = "https://cdn.discordapp.com/emojis";

/// A resolved node: structurally parallel to [`Node`], with mention/link/emoji
/// nodes annotated by their resolution outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedNode {
    Text(String),
    LineBreak,
    Heading {
        level: u8,
        children: Vec<ResolvedNode>,
    },
    Strong(Vec<ResolvedNode>),
    Em(Vec<ResolvedNode>),
    Underline(Vec<ResolvedNode>),
    Strikethrough(Vec<ResolvedNode>),
    Spoiler(Vec<ResolvedNode>),
    BlockQuote(Vec<ResolvedNode>),
    InlineCode(String),
    CodeBlock {
        lang: Option<String>,
        code: String,
    },
    Link {
        children: Vec<ResolvedNode>,
        target: LinkTarget,
    },
    Autolink {
        target: LinkTarget,
    },
    Emoji {
        id: String,
        name: String,
        animated: bool,
        url: String,
        jumbo: bool,
    },
    Twemoji {
        name: String,
        url: String,
        jumbo: bool,
    },
    ChannelMention {
        id: String,
        outcome: ChannelResolution,
    },
    RoleMention {
        id: String,
        outcome: RoleResolution,
    },
    UserMention {
        id: String,
        outcome: UserResolution,
    },
    /// `@everyone` / `@here`: always literal display text, never interactive.
    BroadcastMention {
        display: String,
    },
    Timestamp {
        unix: i64,
        style: Option<char>,
    },
    SlashCommand {
        name: String,
        id: String,
    },
    List {
        ordered: bool,
        start: u32,
        items: Vec<Vec<ResolvedNode>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelResolution {
    Found {
        name: String,
        kind: ChannelKind,
        url: String,
    },
    /// Not in the table, or recorded as no longer existing.
    Unknown,
    /// Exists but is not indexed; distinct from Unknown.
    NoAccess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoleResolution {
    Found { name: String, color: Option<u32> },
    /// Renders as the literal `@<id>`.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserResolution {
    Found { display: String, url: Option<String> },
    /// `display` is a last-known username when one survived deletion.
    Unknown { display: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkTarget {
    /// Arbitrary external URL: new tab, no referrer.
    External { url: String },
    /// URL pointing back into indexed content.
    Internal {
        original: String,
        destination: LinkDestination,
    },
}

/// Destination precedence for internal links: message permalink beats thread
/// permalink beats channel permalink; a non-navigable chip is the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkDestination {
    Message { url: String },
    Thread { url: String },
    Channel { url: String },
    /// No indexed destination; the chip opens the original URL externally.
    Chip,
}

/// Resolve a parsed tree against the metadata side table.
pub fn resolve(nodes: &[Node], meta: &MessageMetadata) -> Vec<ResolvedNode> {
    resolve_sequence(nodes, meta)
}

fn resolve_sequence(nodes: &[Node], meta: &MessageMetadata) -> Vec<ResolvedNode> {
    let mut out: Vec<ResolvedNode> = nodes.iter().map(|n| resolve_node(n, meta)).collect();
    if sequence_is_emoji_only(&out) {
        for node in &mut out {
            match node {
                ResolvedNode::Emoji { jumbo, .. } | ResolvedNode::Twemoji { jumbo, .. } => {
                    *jumbo = true
                }
                _ => {}
            }
        }
    }
    out
}

/// Emoji render large when every sibling in their sequence is an emoji or a
/// lone space, and there is at least one emoji among them.
fn sequence_is_emoji_only(nodes: &[ResolvedNode]) -> bool {
    let mut saw_emoji = false;
    for node in nodes {
        match node {
            ResolvedNode::Emoji { .. } | ResolvedNode::Twemoji { .. } => saw_emoji = true,
            ResolvedNode::Text(t) if t.as_str() == " " => {}
            _ => return false,
        }
    }
    saw_emoji
}

fn resolve_node(node: &Node, meta: &MessageMetadata) -> ResolvedNode {
    match node {
        Node::Text(t) => ResolvedNode::Text(t.clone()),
        Node::LineBreak => ResolvedNode::LineBreak,
        Node::Heading { level, children } => ResolvedNode::Heading {
            level: *level,
            children: resolve_sequence(children, meta),
        },
        Node::Strong(c) => ResolvedNode::Strong(resolve_sequence(c, meta)),
        Node::Em(c) => ResolvedNode::Em(resolve_sequence(c, meta)),
        Node::Underline(c) => ResolvedNode::Underline(resolve_sequence(c, meta)),
        Node::Strikethrough(c) => ResolvedNode::Strikethrough(resolve_sequence(c, meta)),
        Node::Spoiler(c) => ResolvedNode::Spoiler(resolve_sequence(c, meta)),
        Node::BlockQuote(c) => ResolvedNode::BlockQuote(resolve_sequence(c, meta)),
        Node::InlineCode(code) => ResolvedNode::InlineCode(code.clone()),
        Node::CodeBlock { lang, code } => ResolvedNode::CodeBlock {
            lang: lang.clone(),
            code: code.clone(),
        },
        Node::Link { target, children } => ResolvedNode::Link {
            children: resolve_sequence(children, meta),
            target: resolve_link(target, meta),
        },
        Node::Autolink(target) => ResolvedNode::Autolink {
            target: resolve_link(target, meta),
        },
        Node::Emoji { id, animated, name } => ResolvedNode::Emoji {
            id: id.clone(),
            name: name.clone(),
            animated: *animated,
            url: emoji_url(id, *animated),
            jumbo: false,
        },
        Node::Twemoji { name } => ResolvedNode::Twemoji {
            name: name.clone(),
            url: twemoji_url(name),
            jumbo: false,
        },
        Node::Mention { kind, id } => resolve_mention(*kind, id.as_deref(), meta),
        Node::Timestamp { unix, style } => ResolvedNode::Timestamp {
            unix: *unix,
            style: *style,
        },
        Node::SlashCommand { name, id } => ResolvedNode::SlashCommand {
            name: name.clone(),
            id: id.clone(),
        },
        Node::List {
            ordered,
            start,
            items,
        } => ResolvedNode::List {
            ordered: *ordered,
            start: *start,
            items: items.iter().map(|i| resolve_sequence(i, meta)).collect(),
        },
    }
}

fn resolve_mention(kind: MentionKind, id: Option<&str>, meta: &MessageMetadata) -> ResolvedNode {
    match kind {
        MentionKind::Everyone => ResolvedNode::BroadcastMention {
            display: "@everyone".to_string(),
        },
        MentionKind::Here => ResolvedNode::BroadcastMention {
            display: "@here".to_string(),
        },
        MentionKind::Channel => {
            let id = id.unwrap_or_default().to_string();
            let outcome = match meta.channels.get(&id) {
                None => ChannelResolution::Unknown,
                Some(ch) if !ch.exists => ChannelResolution::Unknown,
                Some(ch) if !ch.indexing_enabled => ChannelResolution::NoAccess,
                Some(ch) => ChannelResolution::Found {
                    name: ch.name.clone(),
                    kind: ch.kind,
                    url: ch.url.clone().unwrap_or_else(|| format!("/c/{id}")),
                },
            };
            if matches!(outcome, ChannelResolution::Unknown) {
                tracing::debug!(channel = %id, "channel mention did not resolve");
            }
            ResolvedNode::ChannelMention { id, outcome }
        }
        MentionKind::Role => {
            let id = id.unwrap_or_default().to_string();
            let outcome = match meta.roles.get(&id) {
                Some(role) => RoleResolution::Found {
                    name: role.name.clone(),
                    color: role.color,
                },
                None => RoleResolution::Unknown,
            };
            ResolvedNode::RoleMention { id, outcome }
        }
        MentionKind::User => {
            let id = id.unwrap_or_default().to_string();
            let outcome = match meta.users.get(&id) {
                Some(user) if user.exists => UserResolution::Found {
                    display: user.display().to_string(),
                    url: user.url.clone(),
                },
                Some(user) => UserResolution::Unknown {
                    display: Some(user.username.clone()),
                },
                None => UserResolution::Unknown { display: None },
            };
            ResolvedNode::UserMention { id, outcome }
        }
    }
}

fn resolve_link(target: &str, meta: &MessageMetadata) -> LinkTarget {
    let Some(entry) = meta.internal_links.iter().find(|l| l.original == target) else {
        return LinkTarget::External {
            url: target.to_string(),
        };
    };
    let channel_url = || {
        entry
            .channel
            .url
            .clone()
            .unwrap_or_else(|| format!("/c/{}", entry.channel.id))
    };
    let destination = if let Some(message_id) = &entry.message_id {
        LinkDestination::Message {
            url: format!("/m/{message_id}"),
        }
    } else if entry.channel.kind.is_thread() {
        LinkDestination::Thread { url: channel_url() }
    } else if entry.channel.indexing_enabled {
        LinkDestination::Channel { url: channel_url() }
    } else {
        LinkDestination::Chip
    };
    LinkTarget::Internal {
        original: target.to_string(),
        destination,
    }
}

fn emoji_url(id: &str, animated: bool) -> String {
    let ext = if animated { "gif" } else { "png" };
    format!("{EMOJI_CDN}/{id}.{ext}")
}

/// Hyphen-joined hex codepoints, variation selectors dropped, per twemoji naming.
fn twemoji_url(sequence: &str) -> String {
    let codes: Vec<String> = sequence
        .chars()
        .filter(|&c| c != '\u{FE0F}')
        .map(|c| format!("{:x}", c as u32))
        .collect();
    format!("{TWEMOJI_BASE}/{}.svg", codes.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ChannelInfo, InternalLink, LinkedChannel, RoleInfo, UserInfo};
    use chatmark_parser::parse;

    fn channel(name: &str, exists: bool, indexing: bool) -> ChannelInfo {
        ChannelInfo {
            name: name.to_string(),
            kind: ChannelKind::Text,
            url: None,
            indexing_enabled: indexing,
            exists,
        }
    }

    #[test]
    fn test_channel_mention_table() {
        let mut meta = MessageMetadata::default();
        meta.channels
            .insert("1".to_string(), channel("general", true, true));

        let resolved = resolve(&parse("<#1>"), &meta);
        assert_eq!(
            resolved,
            vec![ResolvedNode::ChannelMention {
                id: "1".to_string(),
                outcome: ChannelResolution::Found {
                    name: "general".to_string(),
                    kind: ChannelKind::Text,
                    url: "/c/1".to_string(),
                },
            }]
        );

        meta.channels
            .insert("1".to_string(), channel("general", true, false));
        let resolved = resolve(&parse("<#1>"), &meta);
        assert!(matches!(
            &resolved[0],
            ResolvedNode::ChannelMention {
                outcome: ChannelResolution::NoAccess,
                ..
            }
        ));

        meta.channels
            .insert("1".to_string(), channel("general", false, true));
        let resolved = resolve(&parse("<#1>"), &meta);
        assert!(matches!(
            &resolved[0],
            ResolvedNode::ChannelMention {
                outcome: ChannelResolution::Unknown,
                ..
            }
        ));

        let resolved = resolve(&parse("<#2>"), &meta);
        assert!(matches!(
            &resolved[0],
            ResolvedNode::ChannelMention {
                outcome: ChannelResolution::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn test_role_and_user_mentions() {
        let mut meta = MessageMetadata::default();
        meta.roles.insert(
            "7".to_string(),
            RoleInfo {
                name: "mods".to_string(),
                color: Some(0xFF0000),
            },
        );
        meta.users.insert(
            "8".to_string(),
            UserInfo {
                username: "kay".to_string(),
                global_name: Some("Kay".to_string()),
                url: Some("/u/8".to_string()),
                exists: true,
            },
        );

        let resolved = resolve(&parse("<@&7> <@8> <@&9> <@10>"), &meta);
        assert_eq!(
            resolved[0],
            ResolvedNode::RoleMention {
                id: "7".to_string(),
                outcome: RoleResolution::Found {
                    name: "mods".to_string(),
                    color: Some(0xFF0000),
                },
            }
        );
        assert_eq!(
            resolved[2],
            ResolvedNode::UserMention {
                id: "8".to_string(),
                outcome: UserResolution::Found {
                    display: "Kay".to_string(),
                    url: Some("/u/8".to_string()),
                },
            }
        );
        assert!(matches!(
            &resolved[4],
            ResolvedNode::RoleMention {
                outcome: RoleResolution::Unknown,
                ..
            }
        ));
        assert!(matches!(
            &resolved[6],
            ResolvedNode::UserMention {
                outcome: UserResolution::Unknown { display: None },
                ..
            }
        ));
    }

    #[test]
    fn test_deleted_user_keeps_last_username() {
        let mut meta = MessageMetadata::default();
        meta.users.insert(
            "8".to_string(),
            UserInfo {
                username: "ghost".to_string(),
                global_name: None,
                url: None,
                exists: false,
            },
        );
        let resolved = resolve(&parse("<@8>"), &meta);
        assert_eq!(
            resolved[0],
            ResolvedNode::UserMention {
                id: "8".to_string(),
                outcome: UserResolution::Unknown {
                    display: Some("ghost".to_string())
                },
            }
        );
    }

    #[test]
    fn test_internal_link_precedence() {
        let mut meta = MessageMetadata::default();
        meta.internal_links.push(InternalLink {
            original: "https://discord.com/channels/9/1/5".to_string(),
            guild_id: "9".to_string(),
            channel: LinkedChannel {
                id: "1".to_string(),
                kind: ChannelKind::Text,
                indexing_enabled: true,
                url: None,
            },
            message_id: Some("5".to_string()),
        });

        // message id wins
        assert_eq!(
            resolve_link("https://discord.com/channels/9/1/5", &meta),
            LinkTarget::Internal {
                original: "https://discord.com/channels/9/1/5".to_string(),
                destination: LinkDestination::Message {
                    url: "/m/5".to_string()
                },
            }
        );

        // thread beats channel when no message id
        meta.internal_links[0].message_id = None;
        meta.internal_links[0].channel.kind = ChannelKind::Thread;
        assert!(matches!(
            resolve_link("https://discord.com/channels/9/1/5", &meta),
            LinkTarget::Internal {
                destination: LinkDestination::Thread { .. },
                ..
            }
        ));

        // indexed channel next
        meta.internal_links[0].channel.kind = ChannelKind::Text;
        assert!(matches!(
            resolve_link("https://discord.com/channels/9/1/5", &meta),
            LinkTarget::Internal {
                destination: LinkDestination::Channel { .. },
                ..
            }
        ));

        // nothing navigable: chip
        meta.internal_links[0].channel.indexing_enabled = false;
        assert!(matches!(
            resolve_link("https://discord.com/channels/9/1/5", &meta),
            LinkTarget::Internal {
                destination: LinkDestination::Chip,
                ..
            }
        ));

        // unrelated URL stays external
        assert_eq!(
            resolve_link("https://example.com", &meta),
            LinkTarget::External {
                url: "https://example.com".to_string()
            }
        );
    }

    #[test]
    fn test_emoji_sizing() {
        let meta = MessageMetadata::default();
        let resolved = resolve(
            &parse("<:a:11111111111111111> <:b:11111111111111111> \u{1F389}"),
            &meta,
        );
        for node in &resolved {
            if let ResolvedNode::Emoji { jumbo, .. } | ResolvedNode::Twemoji { jumbo, .. } = node {
                assert!(jumbo);
            }
        }

        let resolved = resolve(&parse("gg <:a:11111111111111111>"), &meta);
        assert!(matches!(
            resolved.last().unwrap(),
            ResolvedNode::Emoji { jumbo: false, .. }
        ));

        // wider whitespace runs are not lone spaces
        let resolved = resolve(&parse("<:a:11111111111111111>  <:b:11111111111111111>"), &meta);
        for node in &resolved {
            if let ResolvedNode::Emoji { jumbo, .. } = node {
                assert!(!jumbo);
            }
        }
    }

    #[test]
    fn test_broadcast_mentions_stay_literal() {
        let resolved = resolve(&parse("@everyone"), &MessageMetadata::default());
        assert_eq!(
            resolved,
            vec![ResolvedNode::BroadcastMention {
                display: "@everyone".to_string()
            }]
        );
    }

    #[test]
    fn test_twemoji_url_drops_variation_selector() {
        assert_eq!(
            twemoji_url("\u{2764}\u{FE0F}"),
            format!("{TWEMOJI_BASE}/2764.svg")
        );
    }
}
