//! chatmark
//!
//!     Compiles a captured Discord message into a renderer-agnostic document tree.
//!     This crate is the facade over the two pipeline halves:
//!
//!     - `chatmark-parser`: tokenizer, grammar, AST, flattener (pure text to AST)
//!     - `chatmark-render`: semantic resolver, render-tree builder, payload
//!       normalizers, highlight service, and the [`compile`] entry point
//!
//!     Typical use is one call:
//!
//!     ```ignore
//!     let doc = chatmark::compile(&raw_message, &metadata, &RenderConfig::default());
//!     ```
//!
//!     Parse, resolve and build are pure CPU work with no I/O; every input yields a
//!     renderable document. Syntax highlighting is the one async piece and is exposed
//!     separately through [`HighlightService`].

pub use chatmark_parser::{flatten, parse, MentionKind, Node};

pub use chatmark_render::{
    build, compile, resolve, ChannelInfo, ChannelKind, ChannelResolution, Document, Highlight,
    HighlightConfig, HighlightRequest, HighlightService, Highlighted, InternalLink, LinkDestination,
    LinkTarget, LinkedChannel, MessageMetadata, PlainHighlighter, RawMessage, RenderConfig,
    RenderNode, ResolvedNode, RoleInfo, RoleResolution, UserInfo, UserResolution,
};

pub use chatmark_render::normalize;
