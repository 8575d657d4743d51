//! AST definitions for chat markup
//!
//!     The AST is a closed tagged union: every consumer matches exhaustively, so adding a
//!     node kind is a compile error until it is handled everywhere (the resolver, the
//!     render-tree builder and the flattener all consume this enum).
//!
//!     Nodes with children store an ordered sequence. The tree is plain data: serde derives
//!     keep the shapes stable enough for exact golden assertions, and nothing in it borrows
//!     from the source text.

use serde::{Deserialize, Serialize};

/// One node of the parsed message tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal text run. The parser merges adjacent literal tokens into one node.
    Text(String),
    /// A newline inside paragraph content.
    LineBreak,
    /// `#`/`##`/`###` heading; level is always 1-3.
    Heading { level: u8, children: Vec<Node> },
    Strong(Vec<Node>),
    Em(Vec<Node>),
    Underline(Vec<Node>),
    Strikethrough(Vec<Node>),
    /// `||hidden||` click-to-reveal content.
    Spoiler(Vec<Node>),
    BlockQuote(Vec<Node>),
    /// Single-backtick code span; content is verbatim, no inner markup.
    InlineCode(String),
    /// Fenced code block with an optional language tag, kept verbatim.
    CodeBlock { lang: Option<String>, code: String },
    /// `[text](url)` with recursively parsed label content.
    Link { target: String, children: Vec<Node> },
    /// Bare URL.
    Autolink(String),
    /// Guild emoji `<a?:name:id>`.
    Emoji {
        id: String,
        animated: bool,
        name: String,
    },
    /// Unicode emoji sequence found in plain text; `name` is the literal sequence.
    Twemoji { name: String },
    Mention {
        kind: MentionKind,
        /// Absent for `@everyone` / `@here`.
        id: Option<String>,
    },
    /// `<t:unix>` / `<t:unix:style>`.
    Timestamp { unix: i64, style: Option<char> },
    SlashCommand { name: String, id: String },
    List {
        ordered: bool,
        /// First item's literal number for ordered lists, 1 otherwise.
        start: u32,
        items: Vec<Vec<Node>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Channel,
    Role,
    User,
    Everyone,
    Here,
}

impl Node {
    /// Child sequence of a wrapper node, if this kind has one.
    ///
    /// `List` items are intentionally not exposed here: each item is its own sequence
    /// and is walked explicitly by consumers.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Heading { children, .. }
            | Node::Strong(children)
            | Node::Em(children)
            | Node::Underline(children)
            | Node::Strikethrough(children)
            | Node::Spoiler(children)
            | Node::BlockQuote(children)
            | Node::Link { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Same-kind check used by the flattener: wrapper kinds only, payload ignored.
    pub fn same_wrapper_kind(&self, other: &Node) -> bool {
        matches!(
            (self, other),
            (Node::Strong(_), Node::Strong(_))
                | (Node::Em(_), Node::Em(_))
                | (Node::Underline(_), Node::Underline(_))
                | (Node::Strikethrough(_), Node::Strikethrough(_))
                | (Node::Spoiler(_), Node::Spoiler(_))
                | (Node::BlockQuote(_), Node::BlockQuote(_))
        )
    }
}
