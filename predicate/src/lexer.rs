//! Lexer (tokenizer) for predicate source text.

use crate::{ParseError, ParseResult, Span};

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords (case-insensitive)
    And,
    Or,
    Not,
    In,
    Exists,
    True,
    False,

    // Literals
    Ident(String),
    String(String),
    Number(f64),

    // Symbols
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    At,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::In => "IN",
            TokenKind::Exists => "EXISTS",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Ident(_) => "identifier",
            TokenKind::String(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::At => "'@'",
            TokenKind::Eq => "'='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A token with its span.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Lexer state.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            pos: 0,
            column: 1,
        }
    }

    /// Tokenize all input into a vector of tokens ending with Eof.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn span_from(&self, start: usize, start_col: usize) -> Span {
        Span::new(start, self.pos, start_col)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn next_char(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.pos = pos + c.len_utf8();
        self.column += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();

        let start = self.pos;
        let start_col = self.column;

        let Some(c) = self.next_char() else {
            return Ok(Token::new(TokenKind::Eof, self.span_from(start, start_col)));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '@' => TokenKind::At,
            '=' => {
                // Accept both = and ==
                if self.peek_char() == Some('=') {
                    self.next_char();
                }
                TokenKind::Eq
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.next_char();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek_char() == Some('=') {
                    self.next_char();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.next_char();
                    TokenKind::NotEq
                } else {
                    return Err(ParseError::new(
                        "unexpected character '!'",
                        self.span_from(start, start_col),
                    ));
                }
            }
            '"' | '\'' => self.scan_string(c, start, start_col)?,
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(c, start, start_col)?
            }
            '0'..='9' => self.scan_number(c, start, start_col)?,
            '_' | 'a'..='z' | 'A'..='Z' => self.scan_ident_or_keyword(c),
            _ => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", c),
                    self.span_from(start, start_col),
                ));
            }
        };

        Ok(Token::new(kind, self.span_from(start, start_col)))
    }

    fn scan_string(&mut self, quote: char, start: usize, start_col: usize) -> ParseResult<TokenKind> {
        let mut value = String::new();

        loop {
            match self.next_char() {
                None => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        self.span_from(start, start_col),
                    ));
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.next_char() {
                    Some(c @ ('\\' | '"' | '\'')) => value.push(c),
                    Some(c) => {
                        return Err(ParseError::new(
                            format!("invalid escape sequence '\\{}'", c),
                            self.span_from(start, start_col),
                        ));
                    }
                    None => {
                        return Err(ParseError::new(
                            "unterminated escape sequence",
                            self.span_from(start, start_col),
                        ));
                    }
                },
                Some(c) => value.push(c),
            }
        }

        Ok(TokenKind::String(value))
    }

    fn scan_ident_or_keyword(&mut self, first: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first);

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.next_char();
            } else {
                break;
            }
        }

        // Check for keywords (case-insensitive)
        match ident.to_ascii_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "exists" => TokenKind::Exists,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Ident(ident),
        }
    }

    fn scan_number(&mut self, first: char, start: usize, start_col: usize) -> ParseResult<TokenKind> {
        let mut number = String::new();
        number.push(first);

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                number.push(c);
                self.next_char();
            } else {
                break;
            }
        }

        // Only consume '.' when a digit follows, so paths stay unambiguous
        if self.peek_char() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|(_, c)| c.is_ascii_digit()) {
                number.push('.');
                self.next_char();
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        number.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
            }
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let exponent_follows = match lookahead.next() {
                Some((_, '+' | '-')) => lookahead.peek().is_some_and(|(_, c)| c.is_ascii_digit()),
                Some((_, c)) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                number.push('e');
                self.next_char();
                if let Some(sign @ ('+' | '-')) = self.peek_char() {
                    number.push(sign);
                    self.next_char();
                }
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        number.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
            }
        }

        number.parse::<f64>().map(TokenKind::Number).map_err(|_| {
            ParseError::new(
                format!("invalid number literal '{}'", number),
                self.span_from(start, start_col),
            )
        })
    }
}
