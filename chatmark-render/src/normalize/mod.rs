//! Auxiliary normalizers
//!
//!     Independent passes over the non-markup parts of a message record: embeds,
//!     attachment galleries, polls, stickers and the components-v2 layout tree. Each
//!     consumes the raw payload shape as received and emits a presentation-ready value
//!     with the derived fields (scaled dimensions, grid template, vote totals, delivery
//!     URLs) filled in. None of them can fail; malformed fields degrade per item.

pub mod components;
pub mod embed;
pub mod gallery;
pub mod poll;
pub mod sticker;
