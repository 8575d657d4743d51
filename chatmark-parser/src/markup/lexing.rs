//! Lexer
//!
//!     This module orchestrates tokenization for chat markup. Two source rewrites run
//!     before the logos scan; both reproduce quirks of the client renderer rather than
//!     anything a grammar would choose on its own:
//!
//!         1. Indentation sitting immediately before a code-fence line is stripped, so an
//!            indented ``` still opens or closes a fence.
//!         2. A single blank line between two ordered-list items is collapsed, which keeps
//!            the numbering of the second item from restarting at 1.
//!
//!     Tokens carry the byte range of their source text. The parser reads all literal
//!     content through these ranges, so the ranges must stay accurate for whatever source
//!     string the parser is handed; that is why preprocessing rewrites the source before
//!     tokenization instead of patching the token stream after.

use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::token::Token;

/// A token paired with its byte span into the (preprocessed) source.
pub type Spanned = (Token, Range<usize>);

static FENCE_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+(```)").expect("fence indent pattern"));

static ORDERED_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([0-9]{1,9}\. .*)\n\n([0-9]{1,9}\. )").expect("ordered gap pattern"));

/// Rewrite the raw message text before tokenization.
pub fn preprocess(source: &str) -> String {
    let stripped = FENCE_INDENT.replace_all(source, "$1");
    // replace_all cannot see overlapping item pairs, so run to a fixed point;
    // each pass removes at least one blank line, so this is bounded.
    let mut current = stripped.into_owned();
    loop {
        let next = ORDERED_GAP.replace_all(&current, "$1\n$2").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Tokenize preprocessed source into a spanned token stream.
///
/// The token set has a literal fallback for every character class, so lexing is total;
/// should logos still reject a slice, it is surfaced as a `Word` and rendered literally.
pub fn tokenize(source: &str) -> Vec<Spanned> {
    Token::lexer(source)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Word), span))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_indent_stripped() {
        assert_eq!(preprocess("    ```rs\nx\n    ```"), "```rs\nx\n```");
        assert_eq!(preprocess("\t```\ncode\n```"), "```\ncode\n```");
    }

    #[test]
    fn test_fence_indent_leaves_other_indentation() {
        assert_eq!(preprocess("    code line"), "    code line");
    }

    #[test]
    fn test_ordered_gap_collapsed() {
        assert_eq!(preprocess("1. a\n\n2. b"), "1. a\n2. b");
        // three items each separated by a blank line
        assert_eq!(preprocess("1. a\n\n2. b\n\n3. c"), "1. a\n2. b\n3. c");
    }

    #[test]
    fn test_ordered_gap_keeps_real_paragraph_breaks() {
        assert_eq!(preprocess("1. a\n\ntext"), "1. a\n\ntext");
        assert_eq!(preprocess("1. a\n\n\n2. b"), "1. a\n\n\n2. b");
    }

    #[test]
    fn test_token_spans_cover_source() {
        let src = "hi **there**";
        let toks = tokenize(src);
        let rebuilt: String = toks.iter().map(|(_, s)| &src[s.clone()]).collect();
        assert_eq!(rebuilt, src);
    }
}
