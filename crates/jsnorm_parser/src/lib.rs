//! jsnorm_parser: recursive descent parser producing the jsnorm token tree.
//!
//! The parser consumes tokens from [`jsnorm_scanner::Scanner`] and builds
//! nodes directly into a shared [`jsnorm_ast::Ast`] arena. Grammar coverage
//! is the normalization subset described in SPEC_FULL.md: full statement
//! grammar, expression grammar with standard precedence, destructuring,
//! arrows, classes, and module import/export clauses.

pub mod parser;
pub mod precedence;

pub use parser::Parser;
