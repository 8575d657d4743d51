//! Attachment gallery layout
//!
//!     Splits attachments into embeddable images and plain file rows, then picks the
//!     grid template for the image count. Templates 1-10 are fixed; any count above
//!     ten reuses the ten template (the overflow renders into its last cell).

use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif", "bmp"];

const SPOILER_PREFIX: &str = "SPOILER_";

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Attachment {
    fn is_spoiler(&self) -> bool {
        self.filename.starts_with(SPOILER_PREFIX)
    }

    /// Content type when present, filename extension otherwise.
    fn is_image(&self) -> bool {
        if let Some(content_type) = &self.content_type {
            return content_type.starts_with("image/");
        }
        match self.filename.rsplit_once('.') {
            Some((_, ext)) => IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub spoiler: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRow {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub size_display: String,
    pub spoiler: bool,
}

/// Grid template keyed by image count. Above ten the ten template is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalleryTemplate {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
}

impl GalleryTemplate {
    pub fn for_count(count: usize) -> Option<GalleryTemplate> {
        use GalleryTemplate::*;
        Some(match count {
            0 => return None,
            1 => One,
            2 => Two,
            3 => Three,
            4 => Four,
            5 => Five,
            6 => Six,
            7 => Seven,
            8 => Eight,
            9 => Nine,
            _ => Ten,
        })
    }

    /// Per-image `(column span, row span)` cells on a 6-column grid.
    pub fn spans(self) -> &'static [(u8, u8)] {
        use GalleryTemplate::*;
        match self {
            One => &[(6, 2)],
            Two => &[(3, 2), (3, 2)],
            Three => &[(4, 2), (2, 1), (2, 1)],
            Four => &[(3, 1), (3, 1), (3, 1), (3, 1)],
            Five => &[(3, 1), (3, 1), (2, 1), (2, 1), (2, 1)],
            Six => &[(2, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1)],
            Seven => &[(6, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1)],
            Eight => &[(3, 1), (3, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1)],
            Nine => &[
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
            ],
            Ten => &[
                (6, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
                (2, 1),
            ],
        }
    }
}

/// Partition attachments into gallery images and download rows and pick the
/// grid template for the image count.
pub fn normalize(
    attachments: &[Attachment],
) -> (Vec<GalleryImage>, Vec<FileRow>, Option<GalleryTemplate>) {
    let mut images = Vec::new();
    let mut files = Vec::new();
    for attachment in attachments {
        if attachment.is_image() {
            images.push(GalleryImage {
                url: attachment.url.clone(),
                filename: attachment.filename.clone(),
                width: attachment.width,
                height: attachment.height,
                spoiler: attachment.is_spoiler(),
            });
        } else {
            files.push(FileRow {
                filename: attachment.filename.clone(),
                url: attachment.url.clone(),
                size: attachment.size,
                size_display: human_size(attachment.size),
                spoiler: attachment.is_spoiler(),
            });
        }
    }
    let template = GalleryTemplate::for_count(images.len());
    (images, files, template)
}

/// Base-1024 human-readable size, two decimal places above bytes.
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}
