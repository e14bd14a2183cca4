//! The scope and binding arena.
//!
//! Scopes and vars are stored flat and addressed by id; a scope holds a
//! parent id, not a reference, so the arena owns the whole graph. Binding
//! tables preserve insertion order, which is what makes renaming
//! deterministic.

use jsnorm_ast::{InputId, NodeId};
use jsnorm_core::collections::OrderedMap;
use jsnorm_core::intern::InternedString;

/// Handle to a scope in a [`Scopes`] arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a binding in a [`Scopes`] arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VarId(pub u32);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of region a scope covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Module,
    /// A function or arrow: parameters plus a bleeding function-expression
    /// name.
    Function,
    /// A function body block, child of the Function scope.
    FunctionBlock,
    Block,
    For,
    /// The block holding a catch clause; also covers the catch body.
    Catch,
    /// A class: holds a bleeding class-expression name.
    ClassBody,
}

/// How a binding was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    Class,
    Function,
    Param,
    CatchParam,
    Import,
}

/// A binding. The declaration node is the `Name` (or `ImportStar`) that
/// introduced it.
#[derive(Debug, Clone)]
pub struct Var {
    pub name: InternedString,
    pub scope: ScopeId,
    pub node: NodeId,
    pub kind: DeclarationKind,
    pub input: Option<InputId>,
}

impl Var {
    pub fn is_param(&self) -> bool {
        self.kind == DeclarationKind::Param
    }
}

/// One lexical scope.
#[derive(Debug)]
pub struct Scope {
    root: NodeId,
    parent: Option<ScopeId>,
    kind: ScopeKind,
    vars: OrderedMap<InternedString, VarId>,
}

/// The arena owning every scope and var of one pass.
#[derive(Debug, Default)]
pub struct Scopes {
    scopes: Vec<Scope>,
    vars: Vec<Var>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope. Every non-global scope must have a parent.
    pub fn create_scope(&mut self, root: NodeId, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        debug_assert!(parent.is_some() || kind == ScopeKind::Global);
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            root,
            parent,
            kind,
            vars: OrderedMap::new(),
        });
        id
    }

    /// Record a binding. The caller is responsible for redeclaration checks
    /// (see the builder); declaring an already-present name replaces
    /// nothing and returns the existing var.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: InternedString,
        node: NodeId,
        kind: DeclarationKind,
        input: Option<InputId>,
    ) -> VarId {
        if let Some(&existing) = self.scopes[scope.index()].vars.get(&name) {
            return existing;
        }
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Var {
            name,
            scope,
            node,
            kind,
            input,
        });
        self.scopes[scope.index()].vars.insert(name, id);
        id
    }

    /// Look up a name in this scope only.
    pub fn own_slot(&self, scope: ScopeId, name: InternedString) -> Option<VarId> {
        self.scopes[scope.index()].vars.get(&name).copied()
    }

    /// Look up a name through the scope chain.
    pub fn slot(&self, scope: ScopeId, name: InternedString) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(var) = self.own_slot(s, name) {
                return Some(var);
            }
            current = self.parent(s);
        }
        None
    }

    #[inline]
    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id.index()]
    }

    #[inline]
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    #[inline]
    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.index()].kind
    }

    #[inline]
    pub fn root_node(&self, scope: ScopeId) -> NodeId {
        self.scopes[scope.index()].root
    }

    /// The scope's bindings in declaration order.
    pub fn vars_in_order(&self, scope: ScopeId) -> impl Iterator<Item = VarId> + '_ {
        self.scopes[scope.index()].vars.values().copied()
    }

    pub fn var_count(&self, scope: ScopeId) -> usize {
        self.scopes[scope.index()].vars.len()
    }

    pub fn is_global(&self, scope: ScopeId) -> bool {
        self.kind(scope) == ScopeKind::Global
    }

    pub fn is_function_scope(&self, scope: ScopeId) -> bool {
        self.kind(scope) == ScopeKind::Function
    }

    pub fn is_function_block_scope(&self, scope: ScopeId) -> bool {
        self.kind(scope) == ScopeKind::FunctionBlock
    }

    pub fn is_catch_scope(&self, scope: ScopeId) -> bool {
        self.kind(scope) == ScopeKind::Catch
    }

    pub fn is_module_scope(&self, scope: ScopeId) -> bool {
        self.kind(scope) == ScopeKind::Module
    }

    /// Hoist targets are the scopes `var` declarations land in.
    pub fn is_hoist_scope(&self, scope: ScopeId) -> bool {
        matches!(
            self.kind(scope),
            ScopeKind::Global | ScopeKind::Module | ScopeKind::FunctionBlock
        )
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}
