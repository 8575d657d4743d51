//! Token definitions for chat markup
//!
//!     The base scan is a logos lexer over the raw message text. The lexer is deliberately
//!     coarse: it recognizes the unambiguous angle-bracket entities (custom emoji, mentions,
//!     timestamps, slash commands) and bare URLs outright, and reduces everything else to
//!     delimiter runs, words and single glyphs. All grammar decisions that depend on context
//!     (line starts, run lengths, pairing) belong to the parser, not the lexer.
//!
//!     Every token carries its byte span into the source; the parser reads literal text
//!     through those spans rather than through token payloads, so no token needs to own
//!     a string.

use logos::Logos;

/// All tokens produced by the base scan.
///
/// Delimiter characters that can repeat (`*`, `_`, `~`, `|`, backtick) are lexed as maximal
/// runs; the parser splits a run into opener/closer/leftover by length. Characters with no
/// dedicated token fall through to [`Token::Word`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `<:name:id>` or `<a:name:id>`; snowflake ids are 17-19 digits.
    #[regex(r"<a?:[A-Za-z0-9_~]+:[0-9]{17,19}>")]
    CustomEmoji,

    /// `<@id>` or `<@!id>` (the nickname form is equivalent).
    #[regex(r"<@!?[0-9]+>")]
    UserMention,

    #[regex(r"<@&[0-9]+>")]
    RoleMention,

    #[regex(r"<#[0-9]+>")]
    ChannelMention,

    /// `<t:unix>` or `<t:unix:style>`.
    #[regex(r"<t:-?[0-9]+(:[a-zA-Z])?>")]
    Timestamp,

    /// `</name:id>`; subcommand names may contain spaces.
    #[regex(r"</[a-zA-Z0-9_ -]+:[0-9]+>", priority = 10)]
    SlashCommand,

    #[token("@everyone")]
    Everyone,

    #[token("@here")]
    Here,

    /// Bare URL. Stops before `)` so `[text](url)` targets keep their closing paren;
    /// other trailing closing punctuation is trimmed by the parser, not here.
    #[regex(r"(https?|steam)://[^\s<)]+", priority = 10)]
    Url,

    #[regex(r"\*+")]
    Stars,

    #[regex(r"_+")]
    Underscores,

    #[regex(r"~+")]
    Tildes,

    #[regex(r"\|+")]
    Pipes,

    #[regex(r"`+")]
    Backticks,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    /// `# ` / `## ` / `### `. Only a heading when the parser is at a line start.
    #[regex(r"#{1,3} ")]
    HeadingMarker,

    #[token("#")]
    Hash,

    #[token(">")]
    Quote,

    #[token("<")]
    Lt,

    #[token("@")]
    At,

    #[token("\n")]
    Newline,

    #[regex(r"[ \t]+")]
    Space,

    /// Maximal run of characters with no special meaning.
    #[regex(r"[^ \t\n*_~|<>@#`\[\]()]+")]
    Word,
}

impl Token {
    /// Tokens the parser treats as plain literal text when no rule consumes them.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::Word
                | Token::Space
                | Token::Hash
                | Token::Quote
                | Token::Lt
                | Token::At
                | Token::OpenParen
                | Token::CloseParen
                | Token::CloseBracket
                | Token::HeadingMarker
        )
    }
}
