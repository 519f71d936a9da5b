//! Shipval Predicate Language
//!
//! This crate parses applicability predicates (`appliesWhen`):
//! - Logical operators: `and`, `or`, `not`, parentheses
//! - Comparisons between a property path and a literal: `= != < <= > >=`
//! - Membership: `iceClass in [IA, IAS]`
//! - Presence: `exists(hub.pitchType)`
//! - Named predicate references: `@ice_going`
//! - Error handling with location information
//!
//! Binding paths and literals to a schema happens in the catalog.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::*;
pub use error::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse_predicate, Parser};
