//! Embed normalization
//!
//!     Splits embeds into the three render subtypes (gifv, image, generic card) and
//!     derives the presentation fields: accent color as a hex string and the preview
//!     image scaled to fit the 400x300 box.

use serde::{Deserialize, Serialize};

const MAX_WIDTH: u32 = 400;
const MAX_HEIGHT: u32 = 300;

/// Accent used when the embed carries no color.
const NEUTRAL_ACCENT: &str = "#2b2d31";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embed {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default)]
    pub author: Option<EmbedAuthor>,
    #[serde(default)]
    pub footer: Option<EmbedFooter>,
    #[serde(default)]
    pub image: Option<EmbedMedia>,
    #[serde(default)]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default)]
    pub video: Option<EmbedMedia>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmbedMedia {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEmbed {
    pub subtype: EmbedSubtype,
    /// `#rrggbb` accent, neutral when the payload had no color.
    pub accent: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub timestamp: Option<String>,
    pub fields: Vec<EmbedField>,
    pub author: Option<EmbedAuthor>,
    pub footer: Option<EmbedFooter>,
    pub preview: Option<ScaledImage>,
    pub thumbnail: Option<ScaledImage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedSubtype {
    /// Video-like looping media; renders the video element, no card chrome.
    Gifv,
    /// Bare image embed, no card chrome.
    Image,
    /// Full card: title, description, fields, author, footer.
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

pub fn normalize(embed: &Embed) -> NormalizedEmbed {
    let subtype = match embed.kind.as_deref() {
        Some("gifv") => EmbedSubtype::Gifv,
        Some("image") => EmbedSubtype::Image,
        _ => EmbedSubtype::Generic,
    };
    // image embeds put the picture in `thumbnail`
    let preview_media = match subtype {
        EmbedSubtype::Gifv => embed.video.as_ref().or(embed.image.as_ref()),
        EmbedSubtype::Image => embed.thumbnail.as_ref().or(embed.image.as_ref()),
        EmbedSubtype::Generic => embed.image.as_ref(),
    };
    NormalizedEmbed {
        subtype,
        accent: embed
            .color
            .map(|c| format!("#{:06x}", c & 0xFF_FF_FF))
            .unwrap_or_else(|| NEUTRAL_ACCENT.to_string()),
        title: embed.title.clone(),
        description: embed.description.clone(),
        url: embed.url.clone(),
        timestamp: embed.timestamp.clone(),
        fields: embed.fields.clone(),
        author: embed.author.clone(),
        footer: embed.footer.clone(),
        preview: preview_media.map(scale_to_fit),
        thumbnail: match subtype {
            EmbedSubtype::Generic => embed.thumbnail.as_ref().map(scale_to_fit),
            _ => None,
        },
    }
}

/// Fit within 400x300 preserving aspect ratio; never upscales.
fn scale_to_fit(media: &EmbedMedia) -> ScaledImage {
    let (w, h) = match (media.width, media.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => (MAX_WIDTH, MAX_HEIGHT),
    };
    let scale = 1.0_f64
        .min(f64::from(MAX_WIDTH) / f64::from(w))
        .min(f64::from(MAX_HEIGHT) / f64::from(h));
    ScaledImage {
        url: media.url.clone(),
        width: (f64::from(w) * scale).floor() as u32,
        height: (f64::from(h) * scale).floor() as u32,
    }
}
