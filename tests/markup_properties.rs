//! Property tests over the markup pipeline: parse is total, flatten is
//! idempotent, and adversarial inputs finish without blowing up.

use chatmark::{compile, flatten, parse, MessageMetadata, RenderConfig};
use proptest::prelude::*;

proptest! {
    #[test]
    fn parse_never_panics_on_arbitrary_input(input in "\\PC{0,400}") {
        let _ = parse(&input);
    }

    #[test]
    fn parse_never_panics_on_markupish_input(
        input in "[a-z *_~|`#>\\[\\]()<@&:0-9\n-]{0,300}"
    ) {
        let _ = parse(&input);
    }

    #[test]
    fn flatten_is_idempotent(input in "[a-z *_~|`#>\n]{0,200}") {
        let once = flatten(parse(&input));
        let twice = flatten(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn compile_is_total(input in "\\PC{0,300}") {
        let raw = chatmark::RawMessage {
            content: input,
            ..Default::default()
        };
        let _ = compile(&raw, &MessageMetadata::default(), &RenderConfig::default());
    }
}

#[test]
fn adversarial_inputs_terminate() {
    let cases = [
        "*".repeat(2000),
        "|".repeat(2000),
        "~~".repeat(1000),
        "_a".repeat(500),
        "```".to_string(),
        format!("```rust\n{}", "x\n".repeat(500)),
        "||".repeat(800),
        format!("{}end", "> ".repeat(400)),
        "[".repeat(1000),
        format!("[a]({})", "(".repeat(500)),
    ];
    for case in cases {
        let _ = parse(&case);
    }
}

#[test]
fn unterminated_constructs_fall_back_to_literal_text() {
    for input in ["**never closed", "||half", "`tick", "~~strike"] {
        let ast = parse(input);
        let text: String = ast
            .iter()
            .map(|node| match node {
                chatmark::Node::Text(t) => t.clone(),
                other => panic!("expected literal text, got {other:?}"),
            })
            .collect();
        assert_eq!(text, input);
    }
}
