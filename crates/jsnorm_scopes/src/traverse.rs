//! Scoped pre-order traversal.
//!
//! Walks the tree, creating scopes through the [`SyntacticScopeCreator`] as
//! scope roots are entered, and drives a [`ScopedCallback`]. Callbacks may
//! rewrite node payloads (the renamers do) but must not restructure the
//! tree mid-walk.

use crate::builder::{ScopeError, SyntacticScopeCreator};
use crate::scope::{ScopeId, ScopeKind, Scopes};
use jsnorm_ast::util::{
    creates_block_scope, is_class_declaration, is_function_block, is_function_declaration,
};
use jsnorm_ast::{Ast, NodeId, Token};

/// The state handed to callbacks: the (mutable) tree, the scope arena so
/// far, and the active scope chain.
pub struct TraversalState<'t> {
    pub ast: &'t mut Ast,
    pub scopes: &'t Scopes,
    pub stack: &'t [ScopeId],
}

impl TraversalState<'_> {
    pub fn current_scope(&self) -> ScopeId {
        *self.stack.last().expect("traversal outside any scope")
    }

    pub fn in_global_scope(&self) -> bool {
        self.scopes.kind(self.current_scope()) == ScopeKind::Global
    }
}

/// Callbacks for the scoped traversal. `enter_scope` runs after the scope
/// has been built and pushed; `exit_scope` runs before it is popped; `visit`
/// runs pre-order for every node.
pub trait ScopedCallback {
    fn enter_scope(&mut self, _state: &mut TraversalState<'_>) {}
    fn exit_scope(&mut self, _state: &mut TraversalState<'_>) {}
    fn visit(&mut self, _state: &mut TraversalState<'_>, _node: NodeId) {}
}

/// Whether entering `node` enters a new scope.
fn is_scope_root(ast: &Ast, node: NodeId) -> bool {
    match ast.token(node) {
        Token::Root
        | Token::ModuleBody
        | Token::Function
        | Token::Arrow
        | Token::Class
        | Token::For
        | Token::ForIn
        | Token::ForOf
        | Token::Switch => true,
        Token::Block => is_function_block(ast, node) || creates_block_scope(ast, node),
        _ => false,
    }
}

/// Drives one traversal. Owns the scope arena for the duration of the walk
/// and drops it afterward.
pub struct ScopedTraversal<'a> {
    ast: &'a mut Ast,
    creator: &'a mut SyntacticScopeCreator,
    scopes: Scopes,
    stack: Vec<ScopeId>,
}

impl<'a> ScopedTraversal<'a> {
    pub fn new(ast: &'a mut Ast, creator: &'a mut SyntacticScopeCreator) -> Self {
        Self {
            ast,
            creator,
            scopes: Scopes::new(),
            stack: Vec::new(),
        }
    }

    /// Walk the subtree under `root`, which always roots a scope.
    pub fn traverse(mut self, root: NodeId, callback: &mut dyn ScopedCallback) -> Result<(), ScopeError> {
        self.walk(root, callback)
    }

    fn walk(&mut self, node: NodeId, callback: &mut dyn ScopedCallback) -> Result<(), ScopeError> {
        let token = self.ast.token(node);

        // Function and class names straddle scopes: a declaration's name
        // belongs to the enclosing scope, an expression's name only to its
        // own scope. Visit the name child on the correct side of the scope
        // boundary and skip it during the regular child walk.
        let named_scope = matches!(token, Token::Function | Token::Class);
        let is_declaration = match token {
            Token::Function => is_function_declaration(self.ast, node),
            Token::Class => is_class_declaration(self.ast, node),
            _ => false,
        };
        let name_child = if named_scope {
            self.ast.first_child(node)
        } else {
            None
        };

        if is_declaration && !self.stack.is_empty() {
            if let Some(name) = name_child {
                self.visit_one(name, callback);
            }
        }

        let entered = self.stack.is_empty() || is_scope_root(self.ast, node);
        if entered {
            let parent = self.stack.last().copied();
            let scope = self
                .creator
                .create_scope(self.ast, &mut self.scopes, node, parent)?;
            self.stack.push(scope);
            let mut state = TraversalState {
                ast: &mut *self.ast,
                scopes: &self.scopes,
                stack: &self.stack,
            };
            callback.enter_scope(&mut state);
        }

        self.visit_one(node, callback);
        if named_scope && !is_declaration {
            if let Some(name) = name_child {
                self.visit_one(name, callback);
            }
        }

        let mut child = match name_child {
            Some(name) => self.ast.next_sibling(name),
            None => self.ast.first_child(node),
        };
        while let Some(c) = child {
            let next = self.ast.next_sibling(c);
            self.walk(c, callback)?;
            child = next;
        }

        if entered {
            let mut state = TraversalState {
                ast: &mut *self.ast,
                scopes: &self.scopes,
                stack: &self.stack,
            };
            callback.exit_scope(&mut state);
            self.stack.pop();
        }
        Ok(())
    }

    fn visit_one(&mut self, node: NodeId, callback: &mut dyn ScopedCallback) {
        let mut state = TraversalState {
            ast: &mut *self.ast,
            scopes: &self.scopes,
            stack: &self.stack,
        };
        callback.visit(&mut state, node);
    }
}
