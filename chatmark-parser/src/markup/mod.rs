//! Chat markup compilation: tokens, grammar, AST and flattening.

pub mod ast;
pub mod flatten;
pub mod lexing;
pub mod parsing;
pub mod token;

pub use ast::{MentionKind, Node};
pub use flatten::flatten;
pub use lexing::{preprocess, tokenize, Spanned};
pub use parsing::parse;
pub use token::Token;
