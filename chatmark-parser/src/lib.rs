//! # chatmark-parser
//!
//! Tokenizer, parser and AST for Discord-flavored chat markup.
//!
//! The public surface is two functions and one tree:
//! [`parse`](markup::parse) turns raw message content into a [`Node`](markup::Node)
//! sequence, and [`flatten`](markup::flatten) normalizes redundant wrapper nesting.
//! Parsing is total; every input yields a renderable tree.

pub mod markup;

pub use markup::{flatten, parse, MentionKind, Node};
