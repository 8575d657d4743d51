//! chatmark-render
//!
//!     Second half of the chatmark pipeline: takes the AST produced by
//!     `chatmark-parser` plus the message's structured payloads and metadata side
//!     table, and compiles everything into a renderer-agnostic [`Document`].
//!
//!     The pure path is `resolve` then `build`; the auxiliary normalizers handle
//!     embeds, galleries, polls, stickers and components; [`compile`] mounts it all.
//!     The async [`HighlightService`] is the only latency-bearing piece and lives off
//!     the pure path.

pub mod highlight;
pub mod message;
pub mod metadata;
pub mod normalize;
pub mod resolve;
pub mod tree;

pub use highlight::{
    Highlight, HighlightConfig, HighlightRequest, HighlightService, Highlighted, PlainHighlighter,
};
pub use message::{compile, Document, RawMessage, RenderConfig};
pub use metadata::{
    ChannelInfo, ChannelKind, InternalLink, LinkedChannel, MessageMetadata, RoleInfo, UserInfo,
};
pub use resolve::{
    resolve, ChannelResolution, LinkDestination, LinkTarget, ResolvedNode, RoleResolution,
    UserResolution,
};
pub use tree::{build, RenderNode};
