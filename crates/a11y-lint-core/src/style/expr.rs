//! Style value expressions: literals, variable references and function calls.

use super::resolver::MAX_RESOLUTION_DEPTH;

/// A parsed style value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A number with an optional unit (`10%`, `12px`, `0.5`).
    Number {
        /// Numeric value.
        value: f64,
        /// Unit suffix, empty when unitless.
        unit: String,
    },
    /// A hex color literal including the `#`.
    Hex(String),
    /// A bare identifier (`white`, `primary`, `--brand`).
    Ident(String),
    /// A quoted string, without quotes.
    Str(String),
    /// A variable reference (`$brand`, `@brand`).
    Var(String),
    /// A function call with flattened arguments.
    Call {
        /// Function name, lowercased.
        name: String,
        /// Arguments; named arguments are reduced to their value.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Parses the leading expression of a value. Trailing tokens (operators,
    /// extra shorthand parts) are ignored. Calls nested deeper than
    /// [`MAX_RESOLUTION_DEPTH`] make the whole value unparseable.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let mut parser = Parser::new(input);
        let expr = parser.expr();
        if parser.too_deep {
            return None;
        }
        expr
    }

    /// Parses every space-separated top-level expression of a value, e.g.
    /// the parts of a `background` shorthand.
    #[must_use]
    pub fn parse_all(input: &str) -> Vec<Self> {
        let mut parser = Parser::new(input);
        let mut out = Vec::new();
        loop {
            parser.skip_ws();
            if parser.at_end() {
                break;
            }
            match parser.expr() {
                Some(e) => out.push(e),
                None => parser.pos += parser.peek().map_or(1, char::len_utf8),
            }
        }
        if parser.too_deep {
            return Vec::new();
        }
        out
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Open call parentheses.
    nesting: usize,
    too_deep: bool,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            nesting: 0,
            too_deep: false,
        }
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &str {
        let start = self.pos;
        let len = self.rest().find(|c: char| !f(c)).unwrap_or(self.rest().len());
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn expr(&mut self) -> Option<Expr> {
        self.skip_ws();
        let c = self.peek()?;
        match c {
            '$' | '@' => {
                self.pos += 1;
                let name = self.take_while(is_ident_char).to_string();
                if name.is_empty() {
                    return None;
                }
                Some(Expr::Var(format!("{c}{name}")))
            }
            '#' => {
                self.pos += 1;
                let hex = self.take_while(|c| c.is_ascii_alphanumeric());
                Some(Expr::Hex(format!("#{hex}")))
            }
            '"' | '\'' => {
                self.pos += 1;
                let body = self.take_while(|x| x != c).to_string();
                self.pos = (self.pos + 1).min(self.src.len());
                Some(Expr::Str(body))
            }
            c if c.is_ascii_digit()
                || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit()))
                || ((c == '-' || c == '+')
                    && self
                        .peek_second()
                        .is_some_and(|d| d.is_ascii_digit() || d == '.')) =>
            {
                self.number()
            }
            c if is_ident_start(c) => {
                let name = self.take_while(is_ident_char).to_string();
                if self.peek() == Some('(') {
                    if self.nesting >= MAX_RESOLUTION_DEPTH {
                        self.too_deep = true;
                        self.pos = self.src.len();
                        return None;
                    }
                    self.pos += 1;
                    self.nesting += 1;
                    let args = self.args();
                    self.nesting -= 1;
                    return Some(Expr::Call {
                        name: name.to_ascii_lowercase(),
                        args,
                    });
                }
                Some(Expr::Ident(name))
            }
            _ => None,
        }
    }

    fn number(&mut self) -> Option<Expr> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        self.take_while(|c| c.is_ascii_digit() || c == '.');
        let value: f64 = self.src[start..self.pos].parse().ok()?;
        let unit = self
            .take_while(|c| c.is_ascii_alphabetic() || c == '%')
            .to_ascii_lowercase();
        Some(Expr::Number { value, unit })
    }

    /// Parses call arguments up to the matching `)`. Commas, spaces and `/`
    /// all separate arguments; `$name:` prefixes of keyword arguments are dropped.
    fn args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(',' | '/') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            if self.keyword_prefix() {
                continue;
            }
            let before = self.pos;
            match self.expr() {
                Some(e) => args.push(e),
                None => {
                    // Skip an unknown token (operator, stray punctuation).
                    if self.pos == before {
                        self.pos += self.peek().map_or(1, char::len_utf8);
                    }
                }
            }
        }
        args
    }

    /// Consumes `$name:` when it introduces a keyword argument.
    fn keyword_prefix(&mut self) -> bool {
        if self.peek() != Some('$') {
            return false;
        }
        let rest = &self.rest()[1..];
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        let after = rest[len..].trim_start();
        if len > 0 && after.starts_with(':') {
            self.pos = self.src.len() - after.len() + 1;
            return true;
        }
        false
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '-' || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '.'
}
