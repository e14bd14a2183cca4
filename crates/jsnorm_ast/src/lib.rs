//! jsnorm_ast: abstract syntax tree for the jsnorm toolkit.
//!
//! The tree is a Closure-style token tree: every node carries a [`Token`]
//! kind, first-child/next-sibling/parent links, and (for names, string keys
//! and literals) a string payload. Nodes live in a [`tree::Ast`] arena and
//! are addressed by [`tree::NodeId`] handles, which lets passes mutate the
//! tree in place while the scope model holds stable references into it.

pub mod flags;
pub mod language;
pub mod token;
pub mod tree;
pub mod util;

pub use flags::NodeFlags;
pub use language::LanguageMode;
pub use token::Token;
pub use tree::{Ast, InputId, NodeId};
