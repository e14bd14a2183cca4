//! jsnorm_scopes: lexical scopes for the normalization passes.
//!
//! Three pieces:
//! - [`scope`]: the arena of scopes and vars (`ScopeId`/`VarId` handles,
//!   insertion-ordered binding tables),
//! - [`builder`]: the syntactic scope builder that populates one scope from
//!   its root node, with injectable redeclaration handling,
//! - [`traverse`]: a pre-order walk that builds scopes on demand and drives
//!   enter-scope/exit-scope/visit callbacks.

pub mod builder;
pub mod scope;
pub mod traverse;

pub use builder::{
    DefaultRedeclarationHandler, DefaultScopeFactory, RedeclarationHandler, ScopeError,
    ScopeFactory, SyntacticScopeCreator,
};
pub use scope::{DeclarationKind, Scope, ScopeId, ScopeKind, Scopes, Var, VarId};
pub use traverse::{ScopedCallback, ScopedTraversal, TraversalState};
