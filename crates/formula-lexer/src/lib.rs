use formula_ast::span::Span;
use logos::{Lexer, Logos};

#[derive(Debug, Logos, PartialEq, Clone)]
pub enum Tok {
    // Whitespace is skipped
    #[regex(r"[ \t\r\n]+", logos::skip)]
    _Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    _Comment,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    // Note: '=>' is the only token starting with '='; a lone '=' is a lex error
    #[token("=>")]
    FatArrow,

    // Infix operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,

    // Comparison operators (longer first)
    #[token("<=")]
    LessEq,
    #[token("<")]
    Less,
    #[token(">=")]
    GreaterEq,
    #[token(">")]
    Greater,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,

    // Number literals keep their raw text; the parser turns them into rationals
    // (or extension literals such as 0x-prefixed addresses).
    #[regex(r"0x[0-9a-fA-F]+", priority = 5)]
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\u\{[0-9a-fA-F]+\}|\\.)*""#, parse_string)]
    Str(String),

    // Library functions are `$`-prefixed identifiers
    #[regex(r"\$?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn parse_string(lex: &mut Lexer<Tok>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '\'' => out.push('\''),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                'u' => {
                    // expect {HEX+}
                    if chars.next()? != '{' {
                        return None;
                    }
                    let mut hex = String::new();
                    while let Some(&ch) = chars.peek() {
                        chars.next();
                        if ch == '}' {
                            break;
                        }
                        hex.push(ch);
                    }
                    let v = u32::from_str_radix(hex.trim(), 16).ok()?;
                    out.push(char::from_u32(v)?);
                }
                other => {
                    // Unknown escape, keep literally
                    out.push(other);
                }
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[derive(Debug, Clone)]
pub struct Lexed<'a> {
    pub tok: Tok,
    pub span: Span,
    pub text: &'a str,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unexpected character(s) `{text}` at {offset}")]
pub struct LexError {
    pub offset: usize,
    pub text: String,
}

/// Tokenize, dropping anything unrecognized.
pub fn lex(input: &str) -> Vec<Lexed<'_>> {
    let mut out = Vec::new();
    let mut l = Tok::lexer(input);
    while let Some(res) = l.next() {
        let range = l.span();
        if let Ok(tok) = res {
            out.push(Lexed {
                tok,
                span: Span::new(range.start, range.len()),
                text: &input[range.clone()],
            });
        }
    }
    out
}

/// Tokenize, failing on the first unrecognized input.
pub fn lex_strict(input: &str) -> Result<Vec<Lexed<'_>>, LexError> {
    let mut out = Vec::new();
    let mut l = Tok::lexer(input);
    while let Some(res) = l.next() {
        let range = l.span();
        let text = &input[range.clone()];
        match res {
            Ok(tok) => out.push(Lexed { tok, span: Span::new(range.start, range.len()), text }),
            Err(()) => return Err(LexError { offset: range.start, text: text.to_string() }),
        }
    }
    Ok(out)
}
