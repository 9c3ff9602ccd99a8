use formula_ast::ast::{Constant, Expr};
use formula_ast::ext::{recognize, ExtensionRef};
use formula_ast::pretty::binary_precedence;
use formula_lexer::{lex_strict, LexError, Lexed, Tok};
use formula_rational::{Rational, RationalError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("parse error: {0}")]
    Generic(String),
    #[error("parse error: unexpected `{found}` at {offset}")]
    Unexpected { found: String, offset: usize },
    #[error("parse error: unexpected end of input")]
    Eof,
    #[error("parse error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Number(#[from] RationalError),
}

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Extension literals recognized from identifier, number and string lexemes.
    pub extensions: Vec<ExtensionRef>,
}

impl ParseOptions {
    pub fn with_extension(mut self, ext: ExtensionRef) -> Self {
        self.extensions.push(ext);
        self
    }
}

pub fn parse(src: &str) -> Result<Expr, ParseError> {
    parse_with(src, &ParseOptions::default())
}

/// Parse, reifying failure as an `Error` node.
pub fn parse_or_error(src: &str, opts: &ParseOptions) -> Expr {
    parse_with(src, opts).unwrap_or_else(|e| {
        log::debug!("parse failed for {src:?}: {e}");
        Expr::error(e.to_string())
    })
}

pub fn parse_with(src: &str, opts: &ParseOptions) -> Result<Expr, ParseError> {
    let tokens = lex_strict(src)?;
    let exts = opts.extensions.as_slice();
    let mut i = 0usize;

    fn peek<'a>(i: usize, toks: &'a [Lexed<'a>]) -> Option<&'a Lexed<'a>> {
        toks.get(i)
    }
    fn peek_tok<'a>(i: usize, toks: &'a [Lexed<'a>]) -> Option<&'a Tok> {
        toks.get(i).map(|t| &t.tok)
    }
    fn bump<'a>(i: &mut usize, toks: &'a [Lexed<'a>]) -> Result<&'a Lexed<'a>, ParseError> {
        let t = toks.get(*i).ok_or(ParseError::Eof)?;
        *i += 1;
        Ok(t)
    }
    fn unexpected(t: &Lexed) -> ParseError {
        ParseError::Unexpected { found: t.text.to_string(), offset: t.span.offset }
    }
    fn expect<'a>(i: &mut usize, toks: &'a [Lexed<'a>], want: Tok) -> Result<(), ParseError> {
        let t = bump(i, toks)?;
        if t.tok == want {
            Ok(())
        } else {
            Err(unexpected(t))
        }
    }

    fn literal(exts: &[ExtensionRef], lexeme: &str) -> Option<Expr> {
        recognize(exts, lexeme).map(|v| Expr::Constant { value: Constant::Extension(v) })
    }

    fn number(exts: &[ExtensionRef], text: &str, negative: bool) -> Result<Expr, ParseError> {
        if let Some(e) = literal(exts, text) {
            return Ok(e);
        }
        let r: Rational = text.parse()?;
        Ok(Expr::Constant { value: Constant::Number(if negative { r.negate() } else { r }) })
    }

    // `(a, b, ...) =>` starting at an opening parenthesis
    fn lambda_params(i: usize, toks: &[Lexed]) -> Option<(Vec<String>, usize)> {
        let mut j = i + 1;
        let mut params = Vec::new();
        loop {
            let t = toks.get(j)?;
            if t.tok != Tok::Ident {
                return None;
            }
            params.push(t.text.to_string());
            j += 1;
            match toks.get(j)?.tok {
                Tok::Comma => j += 1,
                Tok::RParen => break,
                _ => return None,
            }
        }
        (toks.get(j + 1)?.tok == Tok::FatArrow).then_some((params, j + 2))
    }

    fn items<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
        close: Tok,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut out = Vec::new();
        if peek_tok(*i, toks) == Some(&close) {
            *i += 1;
            return Ok(out);
        }
        loop {
            out.push(parse_expr(i, toks, exts)?);
            let t = bump(i, toks)?;
            match &t.tok {
                Tok::Comma => {}
                tok if *tok == close => return Ok(out),
                _ => return Err(unexpected(t)),
            }
        }
    }

    fn parse_object<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
    ) -> Result<Expr, ParseError> {
        let mut fields = Vec::new();
        loop {
            let key = bump(i, toks)?;
            let name = match &key.tok {
                Tok::Ident => key.text.to_string(),
                Tok::Str(s) => s.clone(),
                _ => return Err(unexpected(key)),
            };
            expect(i, toks, Tok::Colon)?;
            fields.push((name, parse_expr(i, toks, exts)?));
            let t = bump(i, toks)?;
            match t.tok {
                Tok::Comma => {}
                Tok::RBrace => return Ok(Expr::object(fields)),
                _ => return Err(unexpected(t)),
            }
        }
    }

    fn parse_atom<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
    ) -> Result<Expr, ParseError> {
        let t = bump(i, toks)?;
        Ok(match &t.tok {
            Tok::Number => number(exts, t.text, false)?,
            Tok::Str(s) => literal(exts, s).unwrap_or_else(|| Expr::string(s.clone())),
            Tok::Ident => match t.text {
                "true" => Expr::boolean(true),
                "false" => Expr::boolean(false),
                name => literal(exts, name).unwrap_or_else(|| Expr::var(name)),
            },
            Tok::LParen => {
                let e = parse_expr(i, toks, exts)?;
                expect(i, toks, Tok::RParen)?;
                e
            }
            Tok::LBracket => Expr::list(items(i, toks, exts, Tok::RBracket)?),
            Tok::LBrace => {
                // {} is the empty object, {k: v} an object, {a, b} a tuple
                match (peek_tok(*i, toks), peek_tok(*i + 1, toks)) {
                    (Some(Tok::RBrace), _) => {
                        *i += 1;
                        Expr::object(Vec::<(String, Expr)>::new())
                    }
                    (Some(Tok::Ident | Tok::Str(_)), Some(Tok::Colon)) => parse_object(i, toks, exts)?,
                    _ => Expr::tuple(items(i, toks, exts, Tok::RBrace)?),
                }
            }
            _ => return Err(unexpected(t)),
        })
    }

    fn parse_postfix<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
        mut lhs: Expr,
    ) -> Result<Expr, ParseError> {
        loop {
            match peek_tok(*i, toks) {
                Some(Tok::LParen) => {
                    *i += 1;
                    let args = items(i, toks, exts, Tok::RParen)?;
                    lhs = Expr::app(lhs, args);
                }
                Some(Tok::LBracket) => {
                    *i += 1;
                    let sub = parse_expr(i, toks, exts)?;
                    expect(i, toks, Tok::RBracket)?;
                    lhs = Expr::index(lhs, sub);
                }
                Some(Tok::Dot) => {
                    *i += 1;
                    let t = bump(i, toks)?;
                    lhs = match t.tok {
                        Tok::Ident => Expr::field(lhs, t.text),
                        Tok::LParen => {
                            let sub = parse_expr(i, toks, exts)?;
                            expect(i, toks, Tok::RParen)?;
                            Expr::index(lhs, sub)
                        }
                        _ => return Err(unexpected(t)),
                    };
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_prefix<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
    ) -> Result<Expr, ParseError> {
        match peek_tok(*i, toks) {
            Some(Tok::Bang) => {
                *i += 1;
                let x = parse_prefix(i, toks, exts)?;
                Ok(Expr::call("!", vec![x]))
            }
            Some(Tok::Minus) => {
                *i += 1;
                if let Some(t) = peek(*i, toks).filter(|t| t.tok == Tok::Number) {
                    // negative literal
                    *i += 1;
                    let lit = number(exts, t.text, true)?;
                    return parse_postfix(i, toks, exts, lit);
                }
                let x = parse_prefix(i, toks, exts)?;
                Ok(Expr::call("-", vec![x]))
            }
            _ => {
                let atom = parse_atom(i, toks, exts)?;
                parse_postfix(i, toks, exts, atom)
            }
        }
    }

    fn binary_op(tok: &Tok) -> Option<&'static str> {
        Some(match tok {
            Tok::PipePipe => "||",
            Tok::AmpAmp => "&&",
            Tok::EqEq => "==",
            Tok::BangEq => "!=",
            Tok::Less => "<",
            Tok::LessEq => "<=",
            Tok::Greater => ">",
            Tok::GreaterEq => ">=",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Slash => "/",
            Tok::Caret => "^",
            _ => return None,
        })
    }

    fn parse_expr_bp<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
        bp: u8,
    ) -> Result<Expr, ParseError> {
        let mut lhs = parse_prefix(i, toks, exts)?;
        loop {
            let Some(op) = peek_tok(*i, toks).and_then(binary_op) else { break };
            let Some((op_bp, right)) = binary_precedence(op) else { break };
            if op_bp < bp {
                break;
            }
            *i += 1;
            let rhs = parse_expr_bp(i, toks, exts, if right { op_bp } else { op_bp + 1 })?;
            lhs = Expr::call(op, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_expr<'a>(
        i: &mut usize,
        toks: &'a [Lexed<'a>],
        exts: &[ExtensionRef],
    ) -> Result<Expr, ParseError> {
        // lambdas: x => e, (x, y) => e
        if let (Some(Tok::Ident), Some(Tok::FatArrow)) = (peek_tok(*i, toks), peek_tok(*i + 1, toks)) {
            let param = toks[*i].text.to_string();
            *i += 2;
            return Ok(Expr::lambda(param, parse_expr(i, toks, exts)?));
        }
        if peek_tok(*i, toks) == Some(&Tok::LParen) {
            if let Some((params, next)) = lambda_params(*i, toks) {
                *i = next;
                return Ok(Expr::lambda_multi(&params, parse_expr(i, toks, exts)?));
            }
        }
        // c ? a : b
        let cond = parse_expr_bp(i, toks, exts, 0)?;
        if peek_tok(*i, toks) != Some(&Tok::Question) {
            return Ok(cond);
        }
        *i += 1;
        let then = parse_expr(i, toks, exts)?;
        expect(i, toks, Tok::Colon)?;
        let otherwise = parse_expr(i, toks, exts)?;
        Ok(Expr::call("if", vec![cond, then, otherwise]))
    }

    let expr = parse_expr(&mut i, &tokens, exts)?;
    match tokens.get(i) {
        None => Ok(expr),
        Some(t) => Err(unexpected(t)),
    }
}
