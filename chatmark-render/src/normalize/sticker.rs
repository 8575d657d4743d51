//! Sticker delivery resolution
//!
//!     Maps the numeric `format_type` onto a delivery strategy. PNG/APNG/GIF are plain
//!     CDN URLs the presentation layer can load directly. Lottie is the odd one out: the
//!     animation JSON has to be fetched and decoded downstream, so the output models the
//!     loading/failed states explicitly and carries a textual fallback chip for when the
//!     fetch dies.

use serde::{Deserialize, Serialize};

const STICKER_CDN: &str = "https://cdn.discordapp.com/stickers";

#[derive(Debug, Clone, Deserialize)]
pub struct Sticker {
    pub id: String,
    pub name: String,
    pub format_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerRef {
    pub id: String,
    pub name: String,
    pub delivery: StickerDelivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerDelivery {
    /// PNG and APNG both serve as a static CDN image.
    Static { url: String },
    Gif { url: String },
    /// Animation JSON fetched by the presentation layer; `fallback` is the
    /// chip text shown while loading fails.
    Lottie {
        json_url: String,
        state: LottieState,
        fallback: String,
    },
    /// Unrecognized format type; renders the fallback chip only.
    Unsupported { fallback: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LottieState {
    Loading,
    Ready,
    Failed,
}

pub fn normalize(sticker: &Sticker) -> StickerRef {
    let delivery = match sticker.format_type {
        1 | 2 => StickerDelivery::Static {
            url: format!("{STICKER_CDN}/{}.png", sticker.id),
        },
        3 => StickerDelivery::Lottie {
            json_url: format!("{STICKER_CDN}/{}.json", sticker.id),
            state: LottieState::Loading,
            fallback: format!("Sticker: {}", sticker.name),
        },
        4 => StickerDelivery::Gif {
            url: format!("{STICKER_CDN}/{}.gif", sticker.id),
        },
        other => {
            tracing::debug!(format_type = other, sticker = %sticker.id, "unknown sticker format");
            StickerDelivery::Unsupported {
                fallback: format!("Sticker: {}", sticker.name),
            }
        }
    };
    StickerRef {
        id: sticker.id.clone(),
        name: sticker.name.clone(),
        delivery,
    }
}
