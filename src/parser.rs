// parser.rs

//! Tokenizer and recursive-descent parser for the expression language.

use crate::error::EvalError;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub pos: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    List(Vec<Expr>),
    /// `[elem for var in iter]`
    Comprehension {
        elem: Box<Expr>,
        var: String,
        iter: Box<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Method {
        recv: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn unescape(c: char, chars: &mut Chars<'_>, pos: usize) -> Result<Option<char>, EvalError> {
    let out = match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        '\\' | '\'' | '"' => c,
        'x' => {
            let mut code = 0u32;
            for _ in 0..2 {
                let digit = chars
                    .next()
                    .and_then(|(_, d)| d.to_digit(16))
                    .ok_or_else(|| EvalError::syntax(pos, "truncated \\xXX escape"))?;
                code = code * 16 + digit;
            }
            // two hex digits are always a valid char
            char::from_u32(code).unwrap_or('\0')
        }
        // unknown escapes are kept verbatim, backslash included
        _ => return Ok(None),
    };
    Ok(Some(out))
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        let tok = match ch {
            c if c.is_whitespace() => continue,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '%' => Tok::Percent,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            '*' => {
                if next == Some('*') {
                    chars.next();
                    Tok::StarStar
                } else {
                    Tok::Star
                }
            }
            '/' => {
                if next == Some('/') {
                    chars.next();
                    Tok::SlashSlash
                } else {
                    Tok::Slash
                }
            }
            '\'' | '"' => {
                let quote = ch;
                let mut cur = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            let Some((esc_pos, next)) = chars.next() else {
                                break;
                            };
                            match unescape(next, &mut chars, esc_pos)? {
                                Some(u) => cur.push(u),
                                None => {
                                    cur.push('\\');
                                    cur.push(next);
                                }
                            }
                        }
                        _ => cur.push(c),
                    }
                }
                if !closed {
                    return Err(EvalError::syntax(pos, "unterminated string literal"));
                }
                Tok::Str(cur)
            }
            c if c.is_ascii_digit() || (c == '.' && next.is_some_and(|d| d.is_ascii_digit())) => {
                let mut end = pos + c.len_utf8();
                let mut is_float = c == '.';
                while let Some(&(i, d)) = chars.peek() {
                    let accept = match d {
                        '0'..='9' | '_' => true,
                        '.' if !is_float => {
                            is_float = true;
                            true
                        }
                        'e' | 'E' => {
                            is_float = true;
                            chars.next();
                            end = i + 1;
                            if let Some(&(j, '+' | '-')) = chars.peek() {
                                chars.next();
                                end = j + 1;
                            }
                            continue;
                        }
                        _ => false,
                    };
                    if !accept {
                        break;
                    }
                    chars.next();
                    end = i + d.len_utf8();
                }
                let text: String = src[pos..end].chars().filter(|&c| c != '_').collect();
                if is_float {
                    let value = text
                        .parse::<f64>()
                        .map_err(|_| EvalError::syntax(pos, format!("invalid number '{}'", text)))?;
                    Tok::Float(value)
                } else {
                    // only overflow can fail here; digits are all checked
                    let value = text.parse::<i64>().map_err(|_| EvalError::Overflow)?;
                    Tok::Int(value)
                }
            }
            '.' => Tok::Dot,
            c if c.is_alphabetic() || c == '_' => {
                let mut cur = String::from(c);
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        cur.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Tok::Ident(cur)
            }
            other => {
                return Err(EvalError::syntax(pos, format!("unexpected character '{}'", other)));
            }
        };
        tokens.push(Token { tok, pos });
    }
    Ok(tokens)
}

/// Deepest expression tree the parser builds. Evaluation recurses over the
/// tree, so this also bounds the evaluator's stack use.
pub const MAX_DEPTH: usize = 200;

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    end: usize,
    // nodes between the root and the node being built
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.idx).map(|t| &t.tok)
    }

    fn pos(&self) -> usize {
        self.tokens.get(self.idx).map_or(self.end, |t| t.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.idx).map(|t| t.tok.clone());
        if tok.is_some() {
            self.idx += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok, what: &str) -> Result<(), EvalError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(EvalError::syntax(self.pos(), format!("expected {}", what)))
        }
    }

    /// Go one level deeper in the tree; callers reset `depth` on the way out.
    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::syntax(self.pos(), "expression nested too deeply"));
        }
        Ok(())
    }

    fn is_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(name)) if name == kw)
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let base = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => {
                    self.depth = base;
                    return Ok(lhs);
                }
            };
            self.idx += 1;
            // a chain `a + b + c` nests to the left
            self.descend()?;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let base = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::SlashSlash) => BinOp::FloorDiv,
                Some(Tok::Percent) => BinOp::Mod,
                _ => {
                    self.depth = base;
                    return Ok(lhs);
                }
            };
            self.idx += 1;
            self.descend()?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Some(Tok::Minus) => UnaryOp::Neg,
            Some(Tok::Plus) => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.idx += 1;
        self.descend()?;
        let inner = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(inner)))
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.postfix()?;
        if self.eat(&Tok::StarStar) {
            // right associative, and `2 ** -1` is allowed
            self.descend()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn args(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        while !self.eat(&Tok::RParen) {
            args.push(self.expr()?);
            if !self.eat(&Tok::Comma) {
                self.expect(Tok::RParen, "')'")?;
                break;
            }
        }
        Ok(args)
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let base = self.depth;
        let mut expr = self.atom()?;
        loop {
            if matches!(self.peek(), Some(Tok::LParen | Tok::LBracket | Tok::Dot)) {
                self.descend()?;
            }
            match self.peek() {
                Some(Tok::LParen) => {
                    self.idx += 1;
                    let args = self.args()?;
                    expr = Expr::Call { func: Box::new(expr), args };
                }
                Some(Tok::LBracket) => {
                    self.idx += 1;
                    let index = self.expr()?;
                    self.expect(Tok::RBracket, "']'")?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
                }
                Some(Tok::Dot) => {
                    self.idx += 1;
                    let pos = self.pos();
                    let Some(Tok::Ident(name)) = self.bump() else {
                        return Err(EvalError::syntax(pos, "expected method name after '.'"));
                    };
                    if !self.eat(&Tok::LParen) {
                        return Err(EvalError::syntax(self.pos(), format!("method '{}' must be called", name)));
                    }
                    let args = self.args()?;
                    expr = Expr::Method { recv: Box::new(expr), name, args };
                }
                _ => {
                    self.depth = base;
                    return Ok(expr);
                }
            }
        }
    }

    fn list(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Tok::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.expr()?;
        if self.is_keyword("for") {
            self.idx += 1;
            let pos = self.pos();
            let Some(Tok::Ident(var)) = self.bump() else {
                return Err(EvalError::syntax(pos, "expected loop variable after 'for'"));
            };
            if !self.is_keyword("in") {
                return Err(EvalError::syntax(self.pos(), "expected 'in'"));
            }
            self.idx += 1;
            let iter = self.expr()?;
            self.expect(Tok::RBracket, "']'")?;
            return Ok(Expr::Comprehension { elem: Box::new(first), var, iter: Box::new(iter) });
        }
        let mut items = vec![first];
        while self.eat(&Tok::Comma) {
            if self.peek() == Some(&Tok::RBracket) {
                break;
            }
            items.push(self.expr()?);
        }
        self.expect(Tok::RBracket, "']'")?;
        Ok(Expr::List(items))
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        let pos = self.pos();
        match self.bump() {
            Some(Tok::Int(i)) => Ok(Expr::Int(i)),
            Some(Tok::Float(f)) => Ok(Expr::Float(f)),
            Some(Tok::Str(s)) => {
                // adjacent literals concatenate: 'a' 'b'
                let mut s = s;
                while let Some(Tok::Str(next)) = self.peek() {
                    s.push_str(next);
                    self.idx += 1;
                }
                Ok(Expr::Str(s))
            }
            Some(Tok::Ident(name)) if name == "for" || name == "in" => {
                Err(EvalError::syntax(pos, format!("unexpected keyword '{}'", name)))
            }
            Some(Tok::Ident(name)) => Ok(Expr::Name(name)),
            Some(Tok::LParen) => {
                self.descend()?;
                let inner = self.expr()?;
                self.expect(Tok::RParen, "')'")?;
                self.depth -= 1;
                Ok(inner)
            }
            Some(Tok::LBracket) => {
                self.descend()?;
                let list = self.list()?;
                self.depth -= 1;
                Ok(list)
            }
            Some(tok) => Err(EvalError::syntax(pos, format!("unexpected {:?}", tok))),
            None => Err(EvalError::syntax(pos, "unexpected end of input")),
        }
    }
}

pub fn parse(src: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, idx: 0, end: src.len(), depth: 0 };
    let expr = parser.expr()?;
    if parser.idx < parser.tokens.len() {
        return Err(EvalError::syntax(parser.pos(), "unexpected trailing input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinOp, l: Expr, r: Expr) -> Expr {
        Expr::Binary(op, Box::new(l), Box::new(r))
    }

    #[test]
    fn tokenizes_operators_and_literals() {
        let toks: Vec<Tok> = tokenize("'a\\n' * 2 ** 16 // 3.5")
            .unwrap()
            .into_iter()
            .map(|t| t.tok)
            .collect();
        assert_eq!(
            toks,
            vec![
                Tok::Str("a\n".into()),
                Tok::Star,
                Tok::Int(2),
                Tok::StarStar,
                Tok::Int(16),
                Tok::SlashSlash,
                Tok::Float(3.5),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let toks = tokenize(r#""\r\n\x41\'\q""#).unwrap();
        assert_eq!(toks[0].tok, Tok::Str("\r\nA'\\q".into()));
        assert!(matches!(tokenize("'open"), Err(EvalError::Syntax { pos: 0, .. })));
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            bin(BinOp::Add, Expr::Int(1), bin(BinOp::Mul, Expr::Int(2), Expr::Int(3)))
        );
        // -2 ** 2 is -(2 ** 2)
        assert_eq!(
            parse("-2 ** 2").unwrap(),
            Expr::Unary(UnaryOp::Neg, Box::new(bin(BinOp::Pow, Expr::Int(2), Expr::Int(2))))
        );
        assert_eq!(
            parse("2 ** 3 ** 2").unwrap(),
            bin(BinOp::Pow, Expr::Int(2), bin(BinOp::Pow, Expr::Int(3), Expr::Int(2)))
        );
    }

    #[test]
    fn calls_methods_and_comprehensions() {
        let expr = parse(r#""\r\n".join([str(i) for i in range(10)])"#).unwrap();
        let Expr::Method { name, args, .. } = expr else {
            panic!("expected method call");
        };
        assert_eq!(name, "join");
        assert!(matches!(&args[0], Expr::Comprehension { var, .. } if var == "i"));

        assert_eq!(
            parse("cs(10, '#')").unwrap(),
            Expr::Call {
                func: Box::new(Expr::Name("cs".into())),
                args: vec![Expr::Int(10), Expr::Str("#".into())],
            }
        );
        assert_eq!(parse("[1, 2,]").unwrap(), Expr::List(vec![Expr::Int(1), Expr::Int(2)]));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(parse("1 +"), Err(EvalError::Syntax { pos: 3, .. })));
        assert!(matches!(parse("(1"), Err(EvalError::Syntax { .. })));
        assert!(matches!(parse("1 2"), Err(EvalError::Syntax { pos: 2, .. })));
        assert!(matches!(parse("x.upper"), Err(EvalError::Syntax { .. })));
        assert!(matches!(parse("a = 1"), Err(EvalError::Syntax { pos: 2, .. })));
        assert!(matches!(parse(""), Err(EvalError::Syntax { .. })));
    }

    fn nested_too_deeply(result: Result<Expr, EvalError>) -> bool {
        matches!(result, Err(EvalError::Syntax { msg, .. }) if msg.contains("nested too deeply"))
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        assert!(nested_too_deeply(parse(&"(".repeat(100_000))));
        assert!(nested_too_deeply(parse(&format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000)))));
        assert!(nested_too_deeply(parse(&"[".repeat(100_000))));
        assert!(nested_too_deeply(parse(&"-".repeat(100_000))));
        assert!(nested_too_deeply(parse(&vec!["1"; 100_000].join(" + "))));
        assert!(nested_too_deeply(parse(&vec!["2"; 100_000].join(" ** "))));
        assert!(nested_too_deeply(parse(&format!("cs{}", "(1)".repeat(100_000)))));
    }

    #[test]
    fn moderate_nesting_still_parses() {
        assert!(parse(&format!("{}1{}", "(".repeat(50), ")".repeat(50))).is_ok());
        assert!(parse(&vec!["1"; 50].join(" + ")).is_ok());
        assert!(parse("[[[[1]]]][0][0][0][0] * -(-(2))").is_ok());
    }

    #[test]
    fn huge_integer_literal_overflows() {
        assert!(matches!(parse("99999999999999999999"), Err(EvalError::Overflow)));
    }
}
