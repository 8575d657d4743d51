//! Cross-crate pipeline tests: raw content + metadata in, document tree out.

use chatmark::{
    compile, ChannelInfo, ChannelKind, ChannelResolution, LinkTarget, MessageMetadata, RawMessage,
    RenderConfig, RenderNode, ResolvedNode,
};

fn metadata_with_general() -> MessageMetadata {
    let mut meta = MessageMetadata::default();
    meta.channels.insert(
        "123".to_string(),
        ChannelInfo {
            name: "general".to_string(),
            kind: ChannelKind::Text,
            url: None,
            indexing_enabled: true,
            exists: true,
        },
    );
    meta
}

fn message(content: &str) -> RawMessage {
    RawMessage {
        content: content.to_string(),
        ..RawMessage::default()
    }
}

#[test]
fn resolved_sequence_for_mixed_inline_message() {
    let ast = chatmark::flatten(chatmark::parse(
        "Hello **world**, check <#123> ||secret|| https://example.com",
    ));
    let resolved = chatmark::resolve(&ast, &metadata_with_general());

    assert_eq!(
        resolved,
        vec![
            ResolvedNode::Text("Hello ".to_string()),
            ResolvedNode::Strong(vec![ResolvedNode::Text("world".to_string())]),
            ResolvedNode::Text(", check ".to_string()),
            ResolvedNode::ChannelMention {
                id: "123".to_string(),
                outcome: ChannelResolution::Found {
                    name: "general".to_string(),
                    kind: ChannelKind::Text,
                    url: "/c/123".to_string(),
                },
            },
            ResolvedNode::Text(" ".to_string()),
            ResolvedNode::Spoiler(vec![ResolvedNode::Text("secret".to_string())]),
            ResolvedNode::Text(" ".to_string()),
            ResolvedNode::Autolink {
                target: LinkTarget::External {
                    url: "https://example.com".to_string(),
                },
            },
        ]
    );
}

#[test]
fn compiled_tree_for_mixed_inline_message() {
    let doc = compile(
        &message("Hello **world**, check <#123> ||secret|| https://example.com"),
        &metadata_with_general(),
        &RenderConfig::default(),
    );

    assert_eq!(doc.text_tree.len(), 8);
    assert_eq!(doc.text_tree[0], RenderNode::Text("Hello ".to_string()));
    let RenderNode::Element { name, children, .. } = &doc.text_tree[1] else {
        panic!("expected strong element");
    };
    assert_eq!(name, "strong");
    assert_eq!(children, &vec![RenderNode::Text("world".to_string())]);
    let RenderNode::Element { name, attrs, children } = &doc.text_tree[3] else {
        panic!("expected mention element");
    };
    assert_eq!(name, "mention");
    assert_eq!(attrs.get("kind").map(String::as_str), Some("channel"));
    assert_eq!(attrs.get("href").map(String::as_str), Some("/c/123"));
    assert_eq!(children, &vec![RenderNode::Text("#general".to_string())]);
    let RenderNode::Element { name, attrs, .. } = &doc.text_tree[7] else {
        panic!("expected link element");
    };
    assert_eq!(name, "a");
    assert_eq!(attrs.get("target").map(String::as_str), Some("_blank"));
    assert_eq!(attrs.get("rel").map(String::as_str), Some("noreferrer"));
}

#[test]
fn golden_tree_shape() {
    let doc = compile(
        &message("**bold** _it_"),
        &MessageMetadata::default(),
        &RenderConfig::default(),
    );
    insta::assert_snapshot!(
        serde_json::to_string(&doc.text_tree).unwrap(),
        @r#"[{"Element":{"name":"strong","attrs":{},"children":[{"Text":"bold"}]}},{"Text":" "},{"Element":{"name":"em","attrs":{},"children":[{"Text":"it"}]}}]"#
    );
}

#[test]
fn double_forward_renders_outer_snapshot_only() {
    let mut inner = message("innermost");
    inner.snapshot = None;
    let mut forwarded = message("forwarded body");
    forwarded.snapshot = Some(Box::new(inner));
    let mut raw = message("outer body");
    raw.snapshot = Some(Box::new(forwarded));

    let doc = compile(&raw, &MessageMetadata::default(), &RenderConfig::default());
    let snapshot = doc.snapshot.expect("forward renders");
    assert_eq!(
        snapshot.text_tree,
        vec![RenderNode::Text("forwarded body".to_string())]
    );
    assert!(snapshot.snapshot.is_none());
}

#[test]
fn full_payload_message_compiles() {
    let raw: RawMessage = serde_json::from_str(
        r#"{
            "content": "look at <#123>",
            "attachments": [
                {"id": "1", "filename": "a.png", "size": 1024, "url": "https://cdn.example/a.png", "content_type": "image/png"},
                {"id": "2", "filename": "b.zip", "size": 3145728, "url": "https://cdn.example/b.zip", "content_type": "application/zip"}
            ],
            "embeds": [{"type": "rich", "title": "card", "color": 255}],
            "stickers": [{"id": "9", "name": "wave", "format_type": 1}],
            "poll": {
                "question": {"text": "q"},
                "answers": [{"answer_id": 1, "poll_media": {"text": "A"}}],
                "results": {"is_finalized": false, "answer_counts": [{"id": 1, "count": 2}]}
            }
        }"#,
    )
    .unwrap();

    let doc = compile(&raw, &metadata_with_general(), &RenderConfig::default());
    assert_eq!(doc.gallery.len(), 1);
    assert_eq!(doc.files.len(), 1);
    assert_eq!(doc.files[0].size_display, "3.00 MB");
    assert_eq!(doc.embeds[0].accent, "#0000ff");
    assert_eq!(doc.stickers.len(), 1);
    assert_eq!(doc.poll.as_ref().unwrap().total_votes, 2);
    assert!(doc.gallery_template.is_some());
}
