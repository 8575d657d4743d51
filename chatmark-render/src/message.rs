//! Message pipeline
//!
//!     `compile` glues the whole thing together: parse, flatten, resolve, build for the
//!     markup content, plus the auxiliary normalizers for the structured payloads, all
//!     mounted under one `Document`. The pipeline is total; any input yields a
//!     renderable document.

use serde::{Deserialize, Serialize};

use chatmark_parser::{flatten, parse};

use crate::highlight::HighlightConfig;
use crate::metadata::MessageMetadata;
use crate::normalize::components::{self, Component, NormalizedComponent};
use crate::normalize::embed::{self, Embed, NormalizedEmbed};
use crate::normalize::gallery::{self, Attachment, FileRow, GalleryImage, GalleryTemplate};
use crate::normalize::poll::{self, NormalizedPoll, Poll};
use crate::normalize::sticker::{self, Sticker, StickerRef};
use crate::resolve::resolve;
use crate::tree::{build, RenderNode};

/// One captured message as received from the ingest side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub poll: Option<Poll>,
    /// Reply pointer; carried through untouched, rendered separately.
    #[serde(default)]
    pub reference: Option<serde_json::Value>,
    /// At most one forwarded message.
    #[serde(default)]
    pub snapshot: Option<Box<RawMessage>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub highlight: HighlightConfig,
}

/// The compiled, renderer-agnostic document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text_tree: Vec<RenderNode>,
    pub embeds: Vec<NormalizedEmbed>,
    pub gallery: Vec<GalleryImage>,
    pub gallery_template: Option<GalleryTemplate>,
    pub files: Vec<FileRow>,
    pub stickers: Vec<StickerRef>,
    pub poll: Option<NormalizedPoll>,
    pub components: Option<Vec<NormalizedComponent>>,
    pub snapshot: Option<Box<Document>>,
}

/// Compile one message into a [`Document`].
pub fn compile(raw: &RawMessage, metadata: &MessageMetadata, config: &RenderConfig) -> Document {
    compile_at(raw, metadata, config, 0)
}

fn compile_at(
    raw: &RawMessage,
    metadata: &MessageMetadata,
    config: &RenderConfig,
    depth: u8,
) -> Document {
    let ast = flatten(parse(&raw.content));
    let resolved = resolve(&ast, metadata);
    let (gallery_images, files, gallery_template) = gallery::normalize(&raw.attachments);

    let snapshot = match &raw.snapshot {
        Some(inner) if depth == 0 => {
            if inner.snapshot.is_some() {
                tracing::debug!("inner forward snapshot dropped, depth capped at one");
            }
            Some(Box::new(compile_at(inner, metadata, config, 1)))
        }
        Some(_) => {
            tracing::debug!("forward snapshot below depth cap dropped");
            None
        }
        None => None,
    };

    Document {
        text_tree: build(&resolved, &config.highlight),
        embeds: raw.embeds.iter().map(embed::normalize).collect(),
        gallery: gallery_images,
        gallery_template,
        files,
        stickers: raw.stickers.iter().map(sticker::normalize).collect(),
        poll: raw.poll.as_ref().map(poll::normalize),
        components: if raw.components.is_empty() {
            None
        } else {
            Some(components::normalize(&raw.components))
        },
        snapshot,
    }
}
