//! Parser
//!
//!     Recursive descent over the spanned token stream. Block constructs (headings, block
//!     quotes, fenced code, lists) are only recognized when the previous capture ended at a
//!     line start; everything else is inline. Paired delimiters follow the client's regex
//!     semantics rather than CommonMark:
//!
//!         - `**`/`__` close on the last two characters of a delimiter run, so the run's
//!           leading surplus stays inside the span (`***x***` is strong around em).
//!         - `~~` and `||` close on the first two characters of a run (shortest match);
//!           the surplus trails the span as literal text.
//!         - `~~` refuses a closer that is immediately followed by `_`, which keeps
//!           strikethrough from eating into an adjacent underline.
//!         - A backtick span closes only on a run of identical length, and its content is
//!           verbatim.
//!
//!     The interior of a matched pair is re-tokenized from its byte range and parsed with a
//!     fresh sub-parser. That keeps partial-token bookkeeping out of the main loop at the
//!     cost of re-scanning nested spans, which is bounded by the nesting cap below.
//!
//!     Parsing is total. Unterminated openers degrade to literal text where they stand,
//!     an unterminated fence literalizes the remainder of its enclosing span, and a release
//!     build guards the whole entry point so any internal bug degrades to one literal text
//!     node instead of a panic.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{MentionKind, Node};
use super::lexing::{preprocess, tokenize, Spanned};
use super::token::Token;

/// Nesting cap for interior re-parsing. Below the cap behavior matches the client;
/// past it delimiters turn literal, which only adversarial input can reach.
const MAX_DEPTH: u32 = 64;

/// Characters that cannot end a bare autolink.
const TRAILING_PUNCT: &[char] = &['.', ',', ':', ';', '"', '\'', ')', ']'];

/// Unicode emoji sequences: flag pairs, keycaps, and pictographic joins with
/// optional variation selectors, skin tones and ZWJ continuation.
static EMOJI_SEQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:[\x{1F1E6}-\x{1F1FF}]{2})",
        r"|(?:[0-9#*]\x{FE0F}\x{20E3})",
        r"|(?:(?:\p{Emoji_Presentation}|\p{Emoji}\x{FE0F})[\x{1F3FB}-\x{1F3FF}]?",
        r"(?:\x{200D}(?:\p{Emoji_Presentation}|\p{Emoji}\x{FE0F})[\x{1F3FB}-\x{1F3FF}]?)*)",
    ))
    .expect("emoji sequence pattern")
});

static FENCE_LANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_+\-.#]+$").expect("fence language pattern"));

/// Parse raw message content into an AST.
///
/// Total: never panics toward the caller. A release build degrades any internal
/// bug into a single literal text node wrapping the original content.
pub fn parse(content: &str) -> Vec<Node> {
    if cfg!(debug_assertions) {
        parse_inner(content)
    } else {
        std::panic::catch_unwind(|| parse_inner(content))
            .unwrap_or_else(|_| vec![Node::Text(content.to_string())])
    }
}

fn parse_inner(content: &str) -> Vec<Node> {
    if content.is_empty() {
        return Vec::new();
    }
    let source = preprocess(content);
    let toks = tokenize(&source);
    let parser = Parser {
        src: &source,
        toks: &toks,
    };
    parser.parse_seq(0, toks.len(), true, 0)
}

struct Parser<'a> {
    src: &'a str,
    toks: &'a [Spanned],
}

impl Parser<'_> {
    fn kind(&self, i: usize) -> Token {
        self.toks[i].0
    }

    fn slice(&self, i: usize) -> &str {
        &self.src[self.toks[i].1.clone()]
    }

    fn span(&self, i: usize) -> (usize, usize) {
        (self.toks[i].1.start, self.toks[i].1.end)
    }

    /// Byte position one past the last token of `range`, for literalizing remainders.
    fn range_end_byte(&self, end: usize) -> usize {
        if end == 0 {
            0
        } else {
            self.toks[end - 1].1.end
        }
    }

    fn find_newline(&self, from: usize, end: usize) -> usize {
        (from..end)
            .find(|&j| self.kind(j) == Token::Newline)
            .unwrap_or(end)
    }

    /// Re-tokenize a byte range and parse it as a nested span.
    fn parse_bytes(&self, a: usize, b: usize, line_start: bool, depth: u32) -> Vec<Node> {
        let slice = &self.src[a..b];
        if depth >= MAX_DEPTH {
            return if slice.is_empty() {
                Vec::new()
            } else {
                vec![Node::Text(slice.to_string())]
            };
        }
        let toks = tokenize(slice);
        let sub = Parser {
            src: slice,
            toks: &toks,
        };
        sub.parse_seq(0, toks.len(), line_start, depth + 1)
    }

    fn parse_seq(&self, start: usize, end: usize, mut line_start: bool, depth: u32) -> Vec<Node> {
        let mut out: Vec<Node> = Vec::new();
        let mut buf = String::new();
        let mut i = start;

        while i < end {
            if line_start {
                if let Some(next) = self.try_block(&mut out, &mut buf, i, end, depth) {
                    i = next;
                    continue;
                }
            }

            let tok = self.kind(i);
            match tok {
                Token::Newline => {
                    flush_text(&mut out, &mut buf);
                    out.push(Node::LineBreak);
                    line_start = true;
                    i += 1;
                    continue;
                }
                Token::CustomEmoji => {
                    if let Some(node) = parse_custom_emoji(self.slice(i)) {
                        flush_text(&mut out, &mut buf);
                        out.push(node);
                    } else {
                        buf.push_str(self.slice(i));
                    }
                    i += 1;
                }
                Token::UserMention => {
                    let id = self
                        .slice(i)
                        .trim_start_matches("<@")
                        .trim_start_matches('!')
                        .trim_end_matches('>')
                        .to_string();
                    flush_text(&mut out, &mut buf);
                    out.push(Node::Mention {
                        kind: MentionKind::User,
                        id: Some(id),
                    });
                    i += 1;
                }
                Token::RoleMention => {
                    let id = self
                        .slice(i)
                        .trim_start_matches("<@&")
                        .trim_end_matches('>')
                        .to_string();
                    flush_text(&mut out, &mut buf);
                    out.push(Node::Mention {
                        kind: MentionKind::Role,
                        id: Some(id),
                    });
                    i += 1;
                }
                Token::ChannelMention => {
                    let id = self
                        .slice(i)
                        .trim_start_matches("<#")
                        .trim_end_matches('>')
                        .to_string();
                    flush_text(&mut out, &mut buf);
                    out.push(Node::Mention {
                        kind: MentionKind::Channel,
                        id: Some(id),
                    });
                    i += 1;
                }
                Token::Timestamp => {
                    let s = self.slice(i);
                    let inner = &s[3..s.len() - 1];
                    let (num, style) = match inner.split_once(':') {
                        Some((n, st)) => (n, st.chars().next()),
                        None => (inner, None),
                    };
                    match num.parse::<i64>() {
                        Ok(unix) => {
                            flush_text(&mut out, &mut buf);
                            out.push(Node::Timestamp { unix, style });
                        }
                        // out-of-range epoch, keep the raw token visible
                        Err(_) => buf.push_str(s),
                    }
                    i += 1;
                }
                Token::SlashCommand => {
                    let s = self.slice(i);
                    let inner = &s[2..s.len() - 1];
                    if let Some((name, id)) = inner.rsplit_once(':') {
                        flush_text(&mut out, &mut buf);
                        out.push(Node::SlashCommand {
                            name: name.to_string(),
                            id: id.to_string(),
                        });
                    } else {
                        buf.push_str(s);
                    }
                    i += 1;
                }
                Token::Everyone => {
                    flush_text(&mut out, &mut buf);
                    out.push(Node::Mention {
                        kind: MentionKind::Everyone,
                        id: None,
                    });
                    i += 1;
                }
                Token::Here => {
                    flush_text(&mut out, &mut buf);
                    out.push(Node::Mention {
                        kind: MentionKind::Here,
                        id: None,
                    });
                    i += 1;
                }
                Token::Url => {
                    let s = self.slice(i);
                    let trimmed = s.trim_end_matches(TRAILING_PUNCT);
                    if trimmed.len() > scheme_len(trimmed) {
                        flush_text(&mut out, &mut buf);
                        out.push(Node::Autolink(trimmed.to_string()));
                        buf.push_str(&s[trimmed.len()..]);
                    } else {
                        buf.push_str(s);
                    }
                    i += 1;
                }
                Token::Stars => i = self.emphasis(&mut out, &mut buf, i, end, depth, '*'),
                Token::Underscores => i = self.emphasis(&mut out, &mut buf, i, end, depth, '_'),
                Token::Tildes => i = self.short_pair(&mut out, &mut buf, i, end, depth, true),
                Token::Pipes => i = self.short_pair(&mut out, &mut buf, i, end, depth, false),
                Token::Backticks => i = self.inline_code(&mut out, &mut buf, i, end),
                Token::OpenBracket => i = self.link(&mut out, &mut buf, i, end, depth),
                _ => {
                    // Word, Space and the single-glyph fallbacks are plain text here.
                    buf.push_str(self.slice(i));
                    i += 1;
                }
            }
            line_start = false;
        }

        flush_text(&mut out, &mut buf);
        out
    }

    // ---- block constructs -------------------------------------------------

    /// Attempt a block construct at a line start. Returns the next token index when one
    /// was consumed (including its trailing newline, so the caller stays at a line start).
    fn try_block(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
    ) -> Option<usize> {
        match self.kind(i) {
            Token::HeadingMarker => {
                let level = (self.slice(i).len() - 1) as u8;
                let eol = self.find_newline(i + 1, end);
                let children = self.parse_range(i + 1, eol, false, depth);
                flush_text(out, buf);
                out.push(Node::Heading { level, children });
                Some(if eol < end { eol + 1 } else { eol })
            }
            Token::Backticks if self.slice(i).len() >= 3 => {
                Some(self.fence(out, buf, i, end))
            }
            Token::Quote => self.quote(out, buf, i, end, depth),
            _ => self.list(out, buf, i, end, depth),
        }
    }

    fn fence(&self, out: &mut Vec<Node>, buf: &mut String, i: usize, end: usize) -> usize {
        let (open_start, _) = self.span(i);
        let closer = (i + 1..end)
            .find(|&j| self.kind(j) == Token::Backticks && self.slice(j).len() >= 3);
        let Some(j) = closer else {
            // Unterminated fence: the remainder of this span is literal text.
            buf.push_str(&self.src[open_start..self.range_end_byte(end)]);
            return end;
        };

        let (close_start, close_end) = self.span(j);
        let inner = &self.src[open_start + 3..close_start];

        let (lang, code) = match inner.find('\n') {
            Some(nl) if nl > 0 && FENCE_LANG.is_match(&inner[..nl]) => {
                (Some(inner[..nl].to_string()), &inner[nl + 1..])
            }
            _ => (None, inner),
        };
        flush_text(out, buf);
        out.push(Node::CodeBlock {
            lang,
            code: code.trim_matches('\n').to_string(),
        });
        // Surplus backticks after the closing run stay literal.
        buf.push_str(&self.src[close_start + 3..close_end]);
        j + 1
    }

    fn quote(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
    ) -> Option<usize> {
        // `>>> ` swallows the rest of the span; without the space it is literal.
        if i + 3 < end
            && self.kind(i + 1) == Token::Quote
            && self.kind(i + 2) == Token::Quote
            && self.kind(i + 3) == Token::Space
        {
            let children = self.parse_range(i + 4, end, true, depth);
            flush_text(out, buf);
            out.push(Node::BlockQuote(children));
            return Some(end);
        }

        // `> ` quote lines; consecutive ones merge into a single quote.
        if !self.is_quote_line(i, end) {
            return None;
        }
        let mut children: Vec<Node> = Vec::new();
        let mut j = i;
        let mut first = true;
        while j < end && self.is_quote_line(j, end) {
            let content = if self.kind(j + 1) == Token::Space { j + 2 } else { j + 1 };
            let eol = self.find_newline(content, end);
            if !first {
                children.push(Node::LineBreak);
            }
            children.extend(self.parse_range(content, eol, true, depth));
            first = false;
            j = if eol < end { eol + 1 } else { eol };
        }
        flush_text(out, buf);
        out.push(Node::BlockQuote(children));
        Some(j)
    }

    fn is_quote_line(&self, i: usize, end: usize) -> bool {
        i + 1 < end && self.kind(i) == Token::Quote && self.kind(i + 1) == Token::Space
    }

    fn list(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
    ) -> Option<usize> {
        let mi = self.skip_list_indent(i, end);
        let (ordered, first_no) = self.list_marker(mi, end)?;
        let mut items: Vec<Vec<Node>> = Vec::new();
        let mut j = i;
        loop {
            let mk = self.skip_list_indent(j, end);
            match self.list_marker(mk, end) {
                Some((ord, _)) if ord == ordered => {
                    let content = mk + 2; // marker token + the space after it
                    let eol = self.find_newline(content, end);
                    items.push(self.parse_range(content, eol, false, depth));
                    j = if eol < end { eol + 1 } else { eol };
                    if j >= end {
                        break;
                    }
                }
                _ => break,
            }
        }
        flush_text(out, buf);
        out.push(Node::List {
            ordered,
            start: first_no.max(1),
            items,
        });
        Some(j)
    }

    fn skip_list_indent(&self, i: usize, end: usize) -> usize {
        if i < end && self.kind(i) == Token::Space && self.slice(i).len() <= 3 {
            i + 1
        } else {
            i
        }
    }

    fn list_marker(&self, i: usize, end: usize) -> Option<(bool, u32)> {
        if i + 1 >= end || self.kind(i + 1) != Token::Space {
            return None;
        }
        let s = self.slice(i);
        match self.kind(i) {
            Token::Word if s == "-" => Some((false, 1)),
            Token::Stars if s == "*" => Some((false, 1)),
            Token::Word => {
                let num = s.strip_suffix('.')?;
                if num.is_empty() || num.len() > 9 || !num.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some((true, num.parse().unwrap_or(1)))
            }
            _ => None,
        }
    }

    /// Index-range sub-parse within the current tokenization (no partial tokens involved).
    fn parse_range(&self, start: usize, end: usize, line_start: bool, depth: u32) -> Vec<Node> {
        if start >= end {
            return Vec::new();
        }
        if depth >= MAX_DEPTH {
            let a = self.toks[start].1.start;
            let b = self.range_end_byte(end);
            return vec![Node::Text(self.src[a..b].to_string())];
        }
        self.parse_seq(start, end, line_start, depth + 1)
    }

    // ---- paired inline delimiters ----------------------------------------

    /// `**`/`__` (closer = last two of the run) and single `*`/`_` emphasis.
    fn emphasis(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
        ch: char,
    ) -> usize {
        let kind = self.kind(i);
        let len = self.slice(i).len();
        let (open_start, open_end) = self.span(i);

        if len >= 2 {
            let closer = (i + 1..end).find(|&j| {
                self.kind(j) == kind
                    && self.slice(j).len() >= 2
                    && self.span(j).1 - 2 > open_start + 2
            });
            if let Some(j) = closer {
                let (_, close_end) = self.span(j);
                let children = self.parse_bytes(open_start + 2, close_end - 2, false, depth);
                flush_text(out, buf);
                out.push(if ch == '*' {
                    Node::Strong(children)
                } else {
                    Node::Underline(children)
                });
                return j + 1;
            }
        } else {
            // single-character emphasis
            let opener_ok = self.src[open_end..]
                .chars()
                .next()
                .map(|c| !c.is_whitespace())
                .unwrap_or(false);
            if opener_ok {
                let closer = (i + 1..end).find(|&j| {
                    if self.kind(j) != kind || self.slice(j).len() != 1 || j == i + 1 {
                        return false;
                    }
                    if ch == '_' {
                        // `_em_` needs a word boundary after the closer
                        let after = self.src[self.span(j).1..].chars().next();
                        !matches!(after, Some(c) if c.is_alphanumeric())
                    } else {
                        true
                    }
                });
                if let Some(j) = closer {
                    let (close_start, _) = self.span(j);
                    let children = self.parse_bytes(open_end, close_start, false, depth);
                    flush_text(out, buf);
                    out.push(Node::Em(children));
                    return j + 1;
                }
            }
        }

        buf.push_str(self.slice(i));
        i + 1
    }

    /// `~~strike~~` and `||spoiler||`: closer = first two of the run (shortest match).
    fn short_pair(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
        strike: bool,
    ) -> usize {
        let kind = self.kind(i);
        let len = self.slice(i).len();
        if len < 2 {
            buf.push_str(self.slice(i));
            return i + 1;
        }
        let (open_start, _) = self.span(i);
        let closer = (i + 1..end).find(|&j| {
            if self.kind(j) != kind || self.slice(j).len() < 2 {
                return false;
            }
            if self.span(j).0 <= open_start + 2 {
                return false; // empty interior
            }
            if strike && self.slice(j).len() == 2 {
                // closer must not butt against an underline run
                let after = self.src[self.span(j).1..].chars().next();
                if after == Some('_') {
                    return false;
                }
            }
            true
        });
        let Some(j) = closer else {
            buf.push_str(self.slice(i));
            return i + 1;
        };
        let (close_start, close_end) = self.span(j);
        let children = self.parse_bytes(open_start + 2, close_start, false, depth);
        flush_text(out, buf);
        out.push(if strike {
            Node::Strikethrough(children)
        } else {
            Node::Spoiler(children)
        });
        // surplus delimiter characters after the closer stay literal
        buf.push_str(&self.src[close_start + 2..close_end]);
        j + 1
    }

    fn inline_code(&self, out: &mut Vec<Node>, buf: &mut String, i: usize, end: usize) -> usize {
        let len = self.slice(i).len();
        let closer = (i + 1..end)
            .find(|&j| self.kind(j) == Token::Backticks && self.slice(j).len() == len && j > i + 1);
        let Some(j) = closer else {
            buf.push_str(self.slice(i));
            return i + 1;
        };
        let code = &self.src[self.span(i).1..self.span(j).0];
        flush_text(out, buf);
        out.push(Node::InlineCode(code.to_string()));
        j + 1
    }

    fn link(
        &self,
        out: &mut Vec<Node>,
        buf: &mut String,
        i: usize,
        end: usize,
        depth: u32,
    ) -> usize {
        let close_bracket = (i + 1..end).find(|&j| self.kind(j) == Token::CloseBracket);
        let target = close_bracket.and_then(|j| {
            if j + 1 >= end || self.kind(j + 1) != Token::OpenParen {
                return None;
            }
            let close_paren = (j + 2..end).find(|&k| self.kind(k) == Token::CloseParen)?;
            let raw = self.src[self.span(j + 1).1..self.span(close_paren).0].trim();
            let raw = raw.strip_prefix('<').unwrap_or(raw);
            let raw = raw.strip_suffix('>').unwrap_or(raw);
            if scheme_len(raw) == 0 {
                return None;
            }
            Some((j, close_paren, raw.to_string()))
        });
        let Some((j, k, target)) = target else {
            buf.push('[');
            return i + 1;
        };
        let children = self.parse_range(i + 1, j, false, depth);
        flush_text(out, buf);
        out.push(Node::Link { target, children });
        k + 1
    }
}

// ---- helpers --------------------------------------------------------------

/// Length of a recognized URL scheme prefix, 0 when there is none.
fn scheme_len(s: &str) -> usize {
    for prefix in ["https://", "http://", "steam://"] {
        if s.starts_with(prefix) {
            return prefix.len();
        }
    }
    0
}

/// Flush accumulated literal text, splitting out unicode emoji sequences.
fn flush_text(out: &mut Vec<Node>, buf: &mut String) {
    if buf.is_empty() {
        return;
    }
    let mut last = 0;
    for m in EMOJI_SEQ.find_iter(buf) {
        if m.start() > last {
            out.push(Node::Text(buf[last..m.start()].to_string()));
        }
        out.push(Node::Twemoji {
            name: m.as_str().to_string(),
        });
        last = m.end();
    }
    if last < buf.len() {
        out.push(Node::Text(buf[last..].to_string()));
    }
    buf.clear();
}

fn parse_custom_emoji(s: &str) -> Option<Node> {
    let inner = &s[1..s.len() - 1];
    let (animated, rest) = match inner.strip_prefix("a:") {
        Some(rest) => (true, rest),
        None => (false, inner.strip_prefix(':')?),
    };
    let (name, id) = rest.rsplit_once(':')?;
    Some(Node::Emoji {
        id: id.to_string(),
        animated,
        name: name.to_string(),
    })
}
