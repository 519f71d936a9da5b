//! Expression parsing.
//!
//! Precedence, loosest first: `or`, `and`, `not`, then comparison/primary.

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            let start = left.span();
            self.advance();
            let right = self.parse_and()?;
            let span = self.span_from(start);
            left = Expr::Or(Box::new(left), Box::new(right), span);
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) {
            let start = left.span();
            self.advance();
            let right = self.parse_not()?;
            let span = self.span_from(start);
            left = Expr::And(Box::new(left), Box::new(right), span);
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Not) {
            let start = self.advance().span;
            let expr = self.parse_not()?;
            let span = self.span_from(start);
            Ok(Expr::Not(Box::new(expr), span))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(matches!(token.kind, TokenKind::True), token.span))
            }
            TokenKind::At => {
                self.advance();
                let (name, _) = self.expect_ident()?;
                Ok(Expr::Named(name, self.span_from(token.span)))
            }
            TokenKind::Exists => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let path = self.parse_path()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Exists(PathExpr {
                    segments: path.segments,
                    span: self.span_from(token.span),
                }))
            }
            TokenKind::Ident(_) => self.parse_comparison(),
            _ => Err(ParseError::unexpected_token(
                token.span,
                "predicate",
                token.kind.name(),
            )),
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let path = self.parse_path()?;

        if self.check(&TokenKind::In) {
            self.advance();
            self.expect(&TokenKind::LBracket)?;
            let mut values = Vec::new();
            if !self.check(&TokenKind::RBracket) {
                values.push(self.parse_literal()?);
                while self.check(&TokenKind::Comma) {
                    self.advance();
                    values.push(self.parse_literal()?);
                }
            }
            self.expect(&TokenKind::RBracket)?;
            let span = self.span_from(path.span);
            return Ok(Expr::In { path, values, span });
        }

        let op = match self.peek().kind {
            TokenKind::Eq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            ref other => {
                return Err(ParseError::unexpected_token(
                    self.peek().span,
                    "comparison operator",
                    other.name(),
                ))
            }
        };
        self.advance();
        let value = self.parse_literal()?;
        let span = self.span_from(path.span);
        Ok(Expr::Compare {
            path,
            op,
            value,
            span,
        })
    }

    fn parse_path(&mut self) -> ParseResult<PathExpr> {
        let (first, start) = self.expect_ident()?;
        let mut segments = vec![first];
        while self.check(&TokenKind::Dot) {
            self.advance();
            let (segment, _) = self.expect_ident()?;
            segments.push(segment);
        }
        Ok(PathExpr {
            segments,
            span: self.span_from(start),
        })
    }

    fn parse_literal(&mut self) -> ParseResult<Literal> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => {
                // A unit may follow: identifier or quoted symbol ("rev/s")
                match self.peek().kind.clone() {
                    TokenKind::Ident(unit) | TokenKind::String(unit) => {
                        self.advance();
                        Ok(Literal::Quantity(n, unit))
                    }
                    _ => Ok(Literal::Number(n)),
                }
            }
            TokenKind::String(s) => Ok(Literal::String(s)),
            TokenKind::Ident(s) => Ok(Literal::Ident(s)),
            TokenKind::True => Ok(Literal::Bool(true)),
            TokenKind::False => Ok(Literal::Bool(false)),
            other => Err(ParseError::unexpected_token(
                token.span,
                "literal",
                other.name(),
            )),
        }
    }
}
