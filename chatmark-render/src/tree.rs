//! Render-tree builder
//!
//!     Maps the resolved AST 1:1 into a generic document-node tree. A render node is either
//!     literal text or a named element with string attributes and children; no DOM, no
//!     framework types. Attributes live in a `BTreeMap` so serialized output is
//!     deterministic and golden assertions stay stable.
//!
//!     The mapping is structural: source order and nesting are preserved, nothing is
//!     reordered or merged here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::highlight::HighlightConfig;
use crate::resolve::{
    ChannelResolution, LinkDestination, LinkTarget, ResolvedNode, RoleResolution, UserResolution,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderNode {
    Text(String),
    Element {
        name: String,
        attrs: BTreeMap<String, String>,
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    pub fn element(name: &str) -> RenderNode {
        RenderNode::Element {
            name: name.to_string(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> RenderNode {
        if let RenderNode::Element { attrs, .. } = &mut self {
            attrs.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn with_children(mut self, nodes: Vec<RenderNode>) -> RenderNode {
        if let RenderNode::Element { children, .. } = &mut self {
            *children = nodes;
        }
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> RenderNode {
        self.with_children(vec![RenderNode::Text(text.into())])
    }
}

/// Default language allowlist. The effective list is whatever the caller's
/// [`HighlightConfig`] carries; this is only its default value.
pub const KNOWN_LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "cs", "css", "diff", "go", "html", "java", "javascript", "js", "json",
    "kotlin", "lua", "markdown", "md", "php", "python", "py", "ruby", "rust", "sh", "shell",
    "sql", "swift", "toml", "ts", "typescript", "xml", "yaml", "yml",
];

/// Minimal markup escape for code content carried as raw text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the render tree from a resolved AST. The config's language allowlist
/// gates which code blocks keep their language tag.
pub fn build(nodes: &[ResolvedNode], config: &HighlightConfig) -> Vec<RenderNode> {
    nodes.iter().map(|n| build_node(n, config)).collect()
}

fn build_node(node: &ResolvedNode, config: &HighlightConfig) -> RenderNode {
    match node {
        ResolvedNode::Text(t) => RenderNode::Text(t.clone()),
        ResolvedNode::LineBreak => RenderNode::element("br"),
        ResolvedNode::Heading { level, children } => {
            // levels outside 1-3 cannot be produced by the parser
            debug_assert!((1..=3).contains(level));
            let level = (*level).clamp(1, 3);
            RenderNode::element(&format!("h{level}")).with_children(build(children, config))
        }
        ResolvedNode::Strong(c) => RenderNode::element("strong").with_children(build(c, config)),
        ResolvedNode::Em(c) => RenderNode::element("em").with_children(build(c, config)),
        ResolvedNode::Underline(c) => RenderNode::element("u").with_children(build(c, config)),
        ResolvedNode::Strikethrough(c) => {
            RenderNode::element("s").with_children(build(c, config))
        }
        ResolvedNode::Spoiler(c) => RenderNode::element("spoiler").with_children(build(c, config)),
        ResolvedNode::BlockQuote(c) => {
            RenderNode::element("blockquote").with_children(build(c, config))
        }
        ResolvedNode::InlineCode(code) => RenderNode::element("code").with_text(escape(code)),
        ResolvedNode::CodeBlock { lang, code } => build_code_block(lang.as_deref(), code, config),
        ResolvedNode::Link { children, target } => {
            build_link(target).with_children(build(children, config))
        }
        ResolvedNode::Autolink { target } => {
            let label = match target {
                LinkTarget::External { url } => url.clone(),
                LinkTarget::Internal { original, .. } => original.clone(),
            };
            build_link(target).with_text(label)
        }
        ResolvedNode::Emoji {
            name, url, jumbo, ..
        } => build_emoji(name, url, *jumbo),
        ResolvedNode::Twemoji { name, url, jumbo } => build_emoji(name, url, *jumbo),
        ResolvedNode::ChannelMention { id, outcome } => build_channel_mention(id, outcome),
        ResolvedNode::RoleMention { id, outcome } => build_role_mention(id, outcome),
        ResolvedNode::UserMention { outcome, .. } => build_user_mention(outcome),
        ResolvedNode::BroadcastMention { display } => RenderNode::element("mention")
            .with_attr("kind", "broadcast")
            .with_text(display.clone()),
        ResolvedNode::Timestamp { unix, style } => build_timestamp(*unix, *style),
        ResolvedNode::SlashCommand { name, id } => RenderNode::element("command")
            .with_attr("id", id.clone())
            .with_text(format!("/{name}")),
        ResolvedNode::List {
            ordered,
            start,
            items,
        } => {
            let mut list = RenderNode::element(if *ordered { "ol" } else { "ul" });
            if *ordered && *start != 1 {
                list = list.with_attr("start", start.to_string());
            }
            list.with_children(
                items
                    .iter()
                    .map(|item| RenderNode::element("li").with_children(build(item, config)))
                    .collect(),
            )
        }
    }
}

fn build_code_block(lang: Option<&str>, code: &str, config: &HighlightConfig) -> RenderNode {
    let block = RenderNode::element("pre");
    match lang {
        Some(lang) if config.allows(lang) => block
            .with_attr("lang", lang.to_string())
            .with_text(code.to_string()),
        _ => block.with_text(escape(code)),
    }
}

fn build_link(target: &LinkTarget) -> RenderNode {
    match target {
        LinkTarget::External { url } => RenderNode::element("a")
            .with_attr("href", url.clone())
            .with_attr("rel", "noreferrer")
            .with_attr("target", "_blank"),
        LinkTarget::Internal {
            original,
            destination,
        } => match destination {
            LinkDestination::Message { url } => RenderNode::element("a")
                .with_attr("href", url.clone())
                .with_attr("internal", "message"),
            LinkDestination::Thread { url } => RenderNode::element("a")
                .with_attr("href", url.clone())
                .with_attr("internal", "thread"),
            LinkDestination::Channel { url } => RenderNode::element("a")
                .with_attr("href", url.clone())
                .with_attr("internal", "channel"),
            LinkDestination::Chip => RenderNode::element("a")
                .with_attr("href", original.clone())
                .with_attr("internal", "chip")
                .with_attr("rel", "noreferrer")
                .with_attr("target", "_blank"),
        },
    }
}

fn build_emoji(name: &str, url: &str, jumbo: bool) -> RenderNode {
    let node = RenderNode::element("emoji")
        .with_attr("name", name.to_string())
        .with_attr("src", url.to_string());
    if jumbo {
        node.with_attr("size", "large")
    } else {
        node
    }
}

fn build_channel_mention(id: &str, outcome: &ChannelResolution) -> RenderNode {
    let mention = RenderNode::element("mention").with_attr("kind", "channel");
    match outcome {
        ChannelResolution::Found { name, kind, url } => mention
            .with_attr("href", url.clone())
            .with_attr("channel-kind", kind.as_str())
            .with_text(format!("#{name}")),
        ChannelResolution::Unknown => mention
            .with_attr("state", "unknown")
            .with_text(format!("#{id}")),
        ChannelResolution::NoAccess => mention
            .with_attr("state", "no-access")
            .with_text("#private channel"),
    }
}

fn build_role_mention(id: &str, outcome: &RoleResolution) -> RenderNode {
    let mention = RenderNode::element("mention").with_attr("kind", "role");
    match outcome {
        RoleResolution::Found { name, color } => {
            let mention = match color {
                Some(color) => mention.with_attr("color", format!("#{color:06x}")),
                None => mention,
            };
            mention.with_text(format!("@{name}"))
        }
        RoleResolution::Unknown => mention
            .with_attr("state", "unknown")
            .with_text(format!("@{id}")),
    }
}

fn build_user_mention(outcome: &UserResolution) -> RenderNode {
    let mention = RenderNode::element("mention").with_attr("kind", "user");
    match outcome {
        UserResolution::Found { display, url } => {
            let mention = match url {
                Some(url) => mention.with_attr("href", url.clone()),
                None => mention,
            };
            mention.with_text(format!("@{display}"))
        }
        UserResolution::Unknown { display } => {
            let label = match display {
                Some(name) => format!("@{name}"),
                None => "@Unknown user".to_string(),
            };
            mention.with_attr("state", "unknown").with_text(label)
        }
    }
}

fn build_timestamp(unix: i64, style: Option<char>) -> RenderNode {
    let node = RenderNode::element("time").with_attr("unix", unix.to_string());
    let node = match style {
        Some(style) => node.with_attr("style", style.to_string()),
        None => node,
    };
    node.with_text(format_timestamp(unix))
}

/// Absolute "Month D, YYYY" rendering; out-of-range values clamp instead of
/// failing the whole message.
fn format_timestamp(unix: i64) -> String {
    let when: DateTime<Utc> = match DateTime::from_timestamp(unix, 0) {
        Some(when) => when,
        None if unix < 0 => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    };
    when.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ResolvedNode {
        ResolvedNode::Text(s.to_string())
    }

    fn build(nodes: &[ResolvedNode]) -> Vec<RenderNode> {
        super::build(nodes, &HighlightConfig::default())
    }

    #[test]
    fn test_basic_wrappers() {
        let tree = build(&[ResolvedNode::Strong(vec![text("hi")])]);
        assert_eq!(
            tree,
            vec![RenderNode::element("strong").with_text("hi")]
        );
    }

    #[test]
    fn test_code_block_language_gate() {
        let known = build(&[ResolvedNode::CodeBlock {
            lang: Some("RuSt".to_string()),
            code: "fn main() {}".to_string(),
        }]);
        assert_eq!(
            known,
            vec![RenderNode::element("pre")
                .with_attr("lang", "RuSt")
                .with_text("fn main() {}")]
        );

        let unknown = build(&[ResolvedNode::CodeBlock {
            lang: Some("klingon".to_string()),
            code: "<tag>".to_string(),
        }]);
        assert_eq!(
            unknown,
            vec![RenderNode::element("pre").with_text("&lt;tag&gt;")]
        );
    }

    #[test]
    fn test_code_block_honors_caller_allowlist() {
        let config = HighlightConfig {
            theme: "dark".to_string(),
            languages: Vec::new(),
        };
        let tree = super::build(
            &[ResolvedNode::CodeBlock {
                lang: Some("rust".to_string()),
                code: "let x = a < b;".to_string(),
            }],
            &config,
        );
        assert_eq!(
            tree,
            vec![RenderNode::element("pre").with_text("let x = a &lt; b;")]
        );
    }

    #[test]
    fn test_inline_code_escapes() {
        let tree = build(&[ResolvedNode::InlineCode("a < b".to_string())]);
        assert_eq!(
            tree,
            vec![RenderNode::element("code").with_text("a &lt; b")]
        );
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(0), "January 1, 1970");
        assert_eq!(format_timestamp(1735689600), "January 1, 2025");
        // far out of range clamps rather than panicking
        assert_eq!(format_timestamp(i64::MAX), format_timestamp(i64::MAX - 1));
    }

    #[test]
    fn test_external_link_attrs() {
        let tree = build(&[ResolvedNode::Autolink {
            target: LinkTarget::External {
                url: "https://example.com".to_string(),
            },
        }]);
        assert_eq!(
            tree,
            vec![RenderNode::element("a")
                .with_attr("href", "https://example.com")
                .with_attr("rel", "noreferrer")
                .with_attr("target", "_blank")
                .with_text("https://example.com")]
        );
    }

    #[test]
    fn test_ordered_list_start_attr() {
        let tree = build(&[ResolvedNode::List {
            ordered: true,
            start: 4,
            items: vec![vec![text("a")], vec![text("b")]],
        }]);
        let RenderNode::Element { name, attrs, children } = &tree[0] else {
            panic!("expected element");
        };
        assert_eq!(name, "ol");
        assert_eq!(attrs.get("start").map(String::as_str), Some("4"));
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_role_color_attr() {
        let tree = build(&[ResolvedNode::RoleMention {
            id: "7".to_string(),
            outcome: RoleResolution::Found {
                name: "mods".to_string(),
                color: Some(0x00FF00),
            },
        }]);
        assert_eq!(
            tree,
            vec![RenderNode::element("mention")
                .with_attr("kind", "role")
                .with_attr("color", "#00ff00")
                .with_text("@mods")]
        );
    }
}
