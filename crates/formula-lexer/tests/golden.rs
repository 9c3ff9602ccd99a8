use formula_lexer::{lex, lex_strict, Tok};
use pretty_assertions::assert_eq;

fn format_tokens(src: &str) -> String {
    let toks = lex(src);
    let mut out = String::new();
    for t in toks {
        let k = match t.tok {
            Tok::LBrace => "LBrace",
            Tok::RBrace => "RBrace",
            Tok::LParen => "LParen",
            Tok::RParen => "RParen",
            Tok::LBracket => "LBracket",
            Tok::RBracket => "RBracket",
            Tok::Comma => "Comma",
            Tok::Colon => "Colon",
            Tok::Question => "Question",
            Tok::Dot => "Dot",
            Tok::FatArrow => "FatArrow",
            Tok::Plus => "Plus",
            Tok::Minus => "Minus",
            Tok::Star => "Star",
            Tok::Slash => "Slash",
            Tok::Caret => "Caret",
            Tok::AmpAmp => "AmpAmp",
            Tok::PipePipe => "PipePipe",
            Tok::Bang => "Bang",
            Tok::LessEq => "LessEq",
            Tok::Less => "Less",
            Tok::GreaterEq => "GreaterEq",
            Tok::Greater => "Greater",
            Tok::EqEq => "EqEq",
            Tok::BangEq => "BangEq",
            Tok::Number => "Number",
            Tok::Str(_) => "Str",
            Tok::Ident => "Ident",
            Tok::_Whitespace | Tok::_Comment => unreachable!(),
        };
        out.push_str(&format!("{}:{}\n", k, t.text));
    }
    out
}

#[test]
fn identifiers_operators_numbers() {
    let got = format_tokens("foo $max x1 == != <= >= < > && || ! => 12 3.25 0x1f");
    let want = "\
Ident:foo
Ident:$max
Ident:x1
EqEq:==
BangEq:!=
LessEq:<=
GreaterEq:>=
Less:<
Greater:>
AmpAmp:&&
PipePipe:||
Bang:!
FatArrow:=>
Number:12
Number:3.25
Number:0x1f
";
    assert_eq!(got, want);
}

#[test]
fn punctuation_and_field_access() {
    let got = format_tokens("{a: [1,2].(0)} ? x.foo : y // trailing comment");
    let want = "\
LBrace:{
Ident:a
Colon::
LBracket:[
Number:1
Comma:,
Number:2
RBracket:]
Dot:.
LParen:(
Number:0
RParen:)
RBrace:}
Question:?
Ident:x
Dot:.
Ident:foo
Colon::
Ident:y
";
    assert_eq!(got, want);
}

#[test]
fn string_escapes() {
    let toks = lex(r#""hi\n\"there\" \u{41}""#);
    assert_eq!(toks.len(), 1);
    assert_eq!(toks[0].tok, Tok::Str("hi\n\"there\" A".into()));
}

#[test]
fn strict_lexing_reports_offset() {
    let err = lex_strict("1 + #").unwrap_err();
    assert_eq!(err.offset, 4);
    assert_eq!(err.text, "#");
    assert!(lex_strict("a = b").is_err());
}
