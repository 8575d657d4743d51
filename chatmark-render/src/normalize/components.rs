//! Components-v2 layout normalization
//!
//!     The payload is a recursive tree of numerically-tagged nodes. Normalization maps
//!     each known type onto a closed enum and preserves nesting exactly; unknown types
//!     are dropped per node with a debug log rather than failing the tree.
//!
//!     Wire type tags: 1 ActionRow, 2 Button, 3 StringSelect, 9 Section, 10 TextDisplay,
//!     11 Thumbnail, 12 MediaGallery, 13 File, 14 Separator, 17 Container.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub accessory: Option<Box<Component>>,
    #[serde(default)]
    pub divider: Option<bool>,
    #[serde(default)]
    pub spacing: Option<u8>,
    #[serde(default)]
    pub items: Vec<MediaItem>,
    #[serde(default)]
    pub file: Option<UnfurledMedia>,
    #[serde(default)]
    pub media: Option<UnfurledMedia>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaItem {
    pub media: UnfurledMedia,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnfurledMedia {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedComponent {
    TextDisplay {
        content: String,
    },
    Container {
        /// `#rrggbb` accent, absent when the payload had none.
        accent: Option<String>,
        children: Vec<NormalizedComponent>,
    },
    Section {
        children: Vec<NormalizedComponent>,
        accessory: Option<Box<NormalizedComponent>>,
    },
    Separator {
        divider: bool,
        spacing: u8,
    },
    MediaGallery {
        items: Vec<GalleryItem>,
    },
    File {
        url: String,
    },
    ActionRow {
        children: Vec<NormalizedComponent>,
    },
    Button {
        label: Option<String>,
        url: Option<String>,
    },
    Thumbnail {
        url: String,
    },
    Select {
        placeholder: Option<String>,
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub url: String,
    pub description: Option<String>,
    pub spoiler: bool,
}

pub fn normalize(components: &[Component]) -> Vec<NormalizedComponent> {
    components.iter().filter_map(normalize_component).collect()
}

fn normalize_component(component: &Component) -> Option<NormalizedComponent> {
    let normalized = match component.kind {
        1 => NormalizedComponent::ActionRow {
            children: normalize(&component.components),
        },
        2 => NormalizedComponent::Button {
            label: component.label.clone(),
            url: component.url.clone(),
        },
        3 => NormalizedComponent::Select {
            placeholder: component.placeholder.clone(),
            options: component.options.iter().map(|o| o.label.clone()).collect(),
        },
        9 => NormalizedComponent::Section {
            children: normalize(&component.components),
            accessory: component
                .accessory
                .as_deref()
                .and_then(normalize_component)
                .map(Box::new),
        },
        10 => NormalizedComponent::TextDisplay {
            content: component.content.clone().unwrap_or_default(),
        },
        11 => NormalizedComponent::Thumbnail {
            url: component.media.as_ref()?.url.clone(),
        },
        12 => NormalizedComponent::MediaGallery {
            items: component
                .items
                .iter()
                .map(|item| GalleryItem {
                    url: item.media.url.clone(),
                    description: item.description.clone(),
                    spoiler: item.spoiler,
                })
                .collect(),
        },
        13 => NormalizedComponent::File {
            url: component.file.as_ref()?.url.clone(),
        },
        14 => NormalizedComponent::Separator {
            divider: component.divider.unwrap_or(true),
            spacing: component.spacing.unwrap_or(1),
        },
        17 => NormalizedComponent::Container {
            accent: component
                .accent_color
                .map(|c| format!("#{:06x}", c & 0xFF_FF_FF)),
            children: normalize(&component.components),
        },
        other => {
            tracing::debug!(component_type = other, "unknown component type dropped");
            return None;
        }
    };
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_container_preserves_structure() {
        let payload: Vec<Component> = serde_json::from_str(
            r#"[{
                "type": 17,
                "accent_color": 5793266,
                "components": [
                    {"type": 10, "content": "hello"},
                    {"type": 14, "divider": true, "spacing": 2},
                    {
                        "type": 9,
                        "components": [{"type": 10, "content": "inner"}],
                        "accessory": {"type": 11, "media": {"url": "https://cdn.example/t.png"}}
                    }
                ]
            }]"#,
        )
        .unwrap();
        let normalized = normalize(&payload);
        assert_eq!(
            normalized,
            vec![NormalizedComponent::Container {
                accent: Some("#5865f2".to_string()),
                children: vec![
                    NormalizedComponent::TextDisplay {
                        content: "hello".to_string()
                    },
                    NormalizedComponent::Separator {
                        divider: true,
                        spacing: 2
                    },
                    NormalizedComponent::Section {
                        children: vec![NormalizedComponent::TextDisplay {
                            content: "inner".to_string()
                        }],
                        accessory: Some(Box::new(NormalizedComponent::Thumbnail {
                            url: "https://cdn.example/t.png".to_string()
                        })),
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_action_row_with_button_and_select() {
        let payload: Vec<Component> = serde_json::from_str(
            r#"[{
                "type": 1,
                "components": [
                    {"type": 2, "label": "Open", "url": "https://example.com"},
                    {"type": 3, "placeholder": "Pick", "options": [{"label": "a"}, {"label": "b"}]}
                ]
            }]"#,
        )
        .unwrap();
        let normalized = normalize(&payload);
        assert_eq!(
            normalized,
            vec![NormalizedComponent::ActionRow {
                children: vec![
                    NormalizedComponent::Button {
                        label: Some("Open".to_string()),
                        url: Some("https://example.com".to_string()),
                    },
                    NormalizedComponent::Select {
                        placeholder: Some("Pick".to_string()),
                        options: vec!["a".to_string(), "b".to_string()],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_media_gallery_and_file() {
        let payload: Vec<Component> = serde_json::from_str(
            r#"[
                {"type": 12, "items": [{"media": {"url": "https://cdn.example/a.png"}, "spoiler": true}]},
                {"type": 13, "file": {"url": "https://cdn.example/doc.pdf"}}
            ]"#,
        )
        .unwrap();
        let normalized = normalize(&payload);
        assert_eq!(
            normalized,
            vec![
                NormalizedComponent::MediaGallery {
                    items: vec![GalleryItem {
                        url: "https://cdn.example/a.png".to_string(),
                        description: None,
                        spoiler: true,
                    }],
                },
                NormalizedComponent::File {
                    url: "https://cdn.example/doc.pdf".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_type_dropped() {
        let payload: Vec<Component> =
            serde_json::from_str(r#"[{"type": 99}, {"type": 10, "content": "kept"}]"#).unwrap();
        let normalized = normalize(&payload);
        assert_eq!(normalized.len(), 1);
    }
}
