//! The syntactic scope builder.
//!
//! Builds one scope at a time from the scope's root node. `var` declarations
//! percolate to the scope being built only when it is a hoist target;
//! block-level declarations land in the scope whose root is being scanned.
//! Nested scope roots are not descended into, except to collect hoisted
//! `var`s.

use crate::scope::{DeclarationKind, ScopeId, ScopeKind, Scopes};
use jsnorm_ast::util::{
    creates_block_scope, is_class_expression, is_function_block, is_function_expression,
    lhs_nodes_of_declaration,
};
use jsnorm_ast::{Ast, InputId, NodeId, Token};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Errors from scope construction. Redeclarations are not errors; they are
/// routed to the [`RedeclarationHandler`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("illegal scope root: {0:?}")]
    IllegalScopeRoot(Token),
}

/// Injectable handling for duplicate declarations. The default does
/// nothing: earlier validation passes are expected to have reported
/// anything user-facing.
pub trait RedeclarationHandler {
    fn on_redeclaration(
        &mut self,
        scopes: &Scopes,
        scope: ScopeId,
        name: &str,
        node: NodeId,
        input: Option<InputId>,
    );
}

/// The default, silent handler.
#[derive(Debug, Default)]
pub struct DefaultRedeclarationHandler;

impl RedeclarationHandler for DefaultRedeclarationHandler {
    fn on_redeclaration(
        &mut self,
        _scopes: &Scopes,
        _scope: ScopeId,
        _name: &str,
        _node: NodeId,
        _input: Option<InputId>,
    ) {
    }
}

/// Injectable scope construction, so hosts can substitute their own scope
/// representation policy (in practice: the kind assigned to a root).
pub trait ScopeFactory {
    fn create(
        &mut self,
        scopes: &mut Scopes,
        ast: &Ast,
        root: NodeId,
        parent: Option<ScopeId>,
    ) -> ScopeId;
}

/// Derives the scope kind from the root token.
#[derive(Debug, Default)]
pub struct DefaultScopeFactory;

impl ScopeFactory for DefaultScopeFactory {
    fn create(
        &mut self,
        scopes: &mut Scopes,
        ast: &Ast,
        root: NodeId,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let kind = match ast.token(root) {
            Token::Root | Token::Script => ScopeKind::Global,
            Token::ModuleBody => ScopeKind::Module,
            Token::Function | Token::Arrow => ScopeKind::Function,
            Token::Class => ScopeKind::ClassBody,
            Token::For | Token::ForIn | Token::ForOf => ScopeKind::For,
            Token::Switch => ScopeKind::Block,
            Token::Block => {
                if is_function_block(ast, root) {
                    ScopeKind::FunctionBlock
                } else if ast
                    .first_child(root)
                    .map(|c| ast.token(c) == Token::Catch)
                    .unwrap_or(false)
                {
                    ScopeKind::Catch
                } else {
                    ScopeKind::Block
                }
            }
            other => unreachable!("scope factory invoked on non-root token {:?}", other),
        };
        scopes.create_scope(root, parent, kind)
    }
}

const ARGUMENTS: &str = "arguments";

/// Creates scopes from syntax. Holds the injected redeclaration handler and
/// scope factory, and the optional change-root set used to skip scripts
/// during incremental rebuilds.
pub struct SyntacticScopeCreator {
    redeclaration_handler: Box<dyn RedeclarationHandler>,
    scope_factory: Box<dyn ScopeFactory>,
    change_roots: Option<FxHashSet<NodeId>>,
}

impl Default for SyntacticScopeCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntacticScopeCreator {
    pub fn new() -> Self {
        Self {
            redeclaration_handler: Box::new(DefaultRedeclarationHandler),
            scope_factory: Box::new(DefaultScopeFactory),
            change_roots: None,
        }
    }

    pub fn with_redeclaration_handler(handler: Box<dyn RedeclarationHandler>) -> Self {
        Self {
            redeclaration_handler: handler,
            scope_factory: Box::new(DefaultScopeFactory),
            change_roots: None,
        }
    }

    pub fn set_scope_factory(&mut self, factory: Box<dyn ScopeFactory>) {
        self.scope_factory = factory;
    }

    /// Restrict scanning to the given `Script` nodes; others are skipped.
    pub fn set_change_roots(&mut self, roots: FxHashSet<NodeId>) {
        self.change_roots = Some(roots);
    }

    /// Build and populate the scope rooted at `root`.
    pub fn create_scope(
        &mut self,
        ast: &Ast,
        scopes: &mut Scopes,
        root: NodeId,
        parent: Option<ScopeId>,
    ) -> Result<ScopeId, ScopeError> {
        match ast.token(root) {
            Token::Function
            | Token::Arrow
            | Token::Class
            | Token::Root
            | Token::Script
            | Token::ModuleBody
            | Token::For
            | Token::ForIn
            | Token::ForOf
            | Token::Switch
            | Token::Block => {}
            other => return Err(ScopeError::IllegalScopeRoot(other)),
        }
        let scope = self.scope_factory.create(scopes, ast, root, parent);
        let mut scanner = ScopeScanner {
            ast,
            scopes,
            handler: self.redeclaration_handler.as_mut(),
            scope,
            input: ast.input_for(root),
            change_roots: self.change_roots.as_ref(),
        };
        scanner.populate();
        Ok(scope)
    }
}

/// Walks the subtree under a scope root and declares the names it finds.
struct ScopeScanner<'a> {
    ast: &'a Ast,
    scopes: &'a mut Scopes,
    handler: &'a mut dyn RedeclarationHandler,
    scope: ScopeId,
    input: Option<InputId>,
    change_roots: Option<&'a FxHashSet<NodeId>>,
}

impl<'a> ScopeScanner<'a> {
    fn populate(&mut self) {
        let root = self.scopes.root_node(self.scope);
        match self.ast.token(root) {
            Token::Function => {
                // Bleed the function-expression name into the scope.
                let name = self.ast.first_child(root).expect("function name");
                if !self.ast.text(name).is_empty() && is_function_expression(self.ast, root) {
                    self.declare_var(self.scope, name, DeclarationKind::Function);
                }
                let params = self.ast.second_child(root).expect("param list");
                self.declare_lhs(self.scope, params, DeclarationKind::Param);
                // The body is a separate scope; stop here.
            }
            Token::Arrow => {
                let params = self.ast.first_child(root).expect("arrow params");
                self.declare_lhs(self.scope, params, DeclarationKind::Param);
            }
            Token::Class => {
                let name = self.ast.first_child(root).expect("class name");
                if !self.ast.text(name).is_empty() && is_class_expression(self.ast, root) {
                    self.declare_var(self.scope, name, DeclarationKind::Class);
                }
            }
            Token::Root | Token::Script | Token::ModuleBody => {
                self.scan_vars(root, Some(self.scope), Some(self.scope));
            }
            Token::For | Token::ForIn | Token::ForOf | Token::Switch => {
                self.scan_vars(root, None, Some(self.scope));
            }
            Token::Block => {
                if is_function_block(self.ast, root) {
                    self.scan_vars(root, Some(self.scope), Some(self.scope));
                } else {
                    self.scan_vars(root, None, Some(self.scope));
                }
            }
            other => unreachable!("illegal scope root survived validation: {:?}", other),
        }
    }

    /// Gather declarations under `n`. `hoist_scope` receives `var`s (when
    /// scanning for them); `block_scope` receives block-level declarations
    /// (when `n` is within the block scope's own region).
    fn scan_vars(&mut self, n: NodeId, hoist_scope: Option<ScopeId>, block_scope: Option<ScopeId>) {
        match self.ast.token(n) {
            Token::Var => {
                if let Some(hoist) = hoist_scope {
                    self.declare_lhs(hoist, n, DeclarationKind::Var);
                }
                return;
            }
            Token::Let => {
                if let Some(block) = block_scope {
                    self.declare_lhs(block, n, DeclarationKind::Let);
                }
                return;
            }
            Token::Const => {
                if let Some(block) = block_scope {
                    self.declare_lhs(block, n, DeclarationKind::Const);
                }
                return;
            }
            Token::Import => {
                if let Some(hoist) = hoist_scope {
                    self.declare_lhs(hoist, n, DeclarationKind::Import);
                }
                return;
            }
            Token::Function => {
                // Only function statements declare here; expressions bleed
                // their name into their own scope.
                if is_function_expression(self.ast, n) || block_scope.is_none() {
                    return;
                }
                let name = self.ast.first_child(n).expect("function name");
                if self.ast.text(name).is_empty() {
                    return;
                }
                self.declare_var(block_scope.unwrap(), name, DeclarationKind::Function);
                return;
            }
            Token::Arrow => return,
            Token::Class => {
                if is_class_expression(self.ast, n) || block_scope.is_none() {
                    return;
                }
                let name = self.ast.first_child(n).expect("class name");
                if self.ast.text(name).is_empty() {
                    return;
                }
                self.declare_var(block_scope.unwrap(), name, DeclarationKind::Class);
                return;
            }
            Token::Catch => {
                // The catch binding lands in the scope of the block above
                // the catch; the body shares that scope, so no new scope is
                // made for it here.
                if let Some(block) = block_scope {
                    self.declare_lhs(block, n, DeclarationKind::CatchParam);
                }
                let body = self.ast.second_child(n).expect("catch body");
                self.scan_vars(body, hoist_scope, block_scope);
                return;
            }
            Token::Script => {
                if let Some(change_roots) = self.change_roots {
                    if !change_roots.contains(&n) {
                        return;
                    }
                }
                self.input = self.ast.input(n);
            }
            Token::ModuleBody => {
                // Module bodies are not part of the global scope.
                if let Some(hoist) = hoist_scope {
                    if self.scopes.is_global(hoist) {
                        return;
                    }
                }
            }
            _ => {}
        }

        let is_block_start = block_scope
            .map(|b| self.scopes.root_node(b) == n)
            .unwrap_or(false);
        let entering_new_block = !is_block_start && creates_block_scope(self.ast, n);
        if entering_new_block && hoist_scope.is_none() {
            // Only enter new blocks when scanning for hoisted vars.
            return;
        }

        // Declarations only occur in statement-level positions, so only
        // statement lists and control structures need descending.
        if jsnorm_ast::util::is_control_structure(self.ast, n)
            || jsnorm_ast::util::is_statement_block(self.ast, n)
        {
            for child in self.ast.children(n) {
                self.scan_vars(
                    child,
                    hoist_scope,
                    if entering_new_block { None } else { block_scope },
                );
            }
        }
    }

    fn declare_lhs(&mut self, scope: ScopeId, declaration: NodeId, kind: DeclarationKind) {
        for lhs in lhs_nodes_of_declaration(self.ast, declaration) {
            self.declare_var(scope, lhs, kind);
        }
    }

    fn declare_var(&mut self, scope: ScopeId, node: NodeId, kind: DeclarationKind) {
        debug_assert!(matches!(
            self.ast.token(node),
            Token::Name | Token::StringKey | Token::ImportStar
        ));
        let name = self.ast.string(node).expect("name payload");
        let text = self.ast.text(node);

        // The same declaration node can be reached twice while scanning;
        // that is not a redeclaration.
        if let Some(existing) = self.scopes.own_slot(scope, name) {
            if self.scopes.var(existing).node == node {
                return;
            }
        }

        let arguments_shadow = (self.scopes.is_function_scope(scope)
            || self.scopes.is_function_block_scope(scope))
            && text == ARGUMENTS;

        if self.scopes.own_slot(scope, name).is_some()
            || self.shadowing_disallowed(scope, name)
            || arguments_shadow
        {
            let text = text.to_string();
            self.handler
                .on_redeclaration(self.scopes, scope, &text, node, self.input);
        } else {
            self.scopes.declare(scope, name, node, kind, self.input);
        }
    }

    /// Function body declarations may not shadow the function's parameters.
    fn shadowing_disallowed(&self, scope: ScopeId, name: jsnorm_core::intern::InternedString) -> bool {
        if self.scopes.is_function_block_scope(scope) {
            if let Some(parent) = self.scopes.parent(scope) {
                if let Some(var) = self.scopes.own_slot(parent, name) {
                    return self.scopes.var(var).is_param();
                }
            }
        }
        false
    }
}
