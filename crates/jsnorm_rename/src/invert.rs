//! The rename inverter.
//!
//! Consumes a tree whose locals are already uniquified and strips
//! `$jscomp$N` suffixes where the shorter name cannot collide. Names are
//! handled per scope at scope exit, innermost first; the set of names
//! referenced in a scope (and everything below it) decides what is safe.
//! Global bindings are never touched, and the `JSCompiler_` prefix minted
//! for formerly-underscore names is left alone.

use crate::uniquify::UNIQUE_NAME_SEPARATOR;
use jsnorm_ast::util::is_reference_name;
use jsnorm_ast::{Ast, NodeId};
use jsnorm_core::collections::MultiMap;
use jsnorm_core::intern::InternedString;
use jsnorm_scopes::{
    ScopeError, ScopedCallback, ScopedTraversal, SyntacticScopeCreator, TraversalState,
};
use rustc_hash::FxHashSet;
use tracing::debug;

const ARGUMENTS: &str = "arguments";

/// The inversion pass.
#[derive(Debug, Default)]
pub struct RenameInverter;

impl RenameInverter {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&mut self, ast: &mut Ast, root: NodeId) -> Result<(), ScopeError> {
        debug!("inverting uniquified names");
        let mut creator = SyntacticScopeCreator::new();
        let mut callback = InverterCallback {
            referenced: FxHashSet::default(),
            reference_stack: Vec::new(),
            name_map: MultiMap::new(),
        };
        ScopedTraversal::new(ast, &mut creator).traverse(root, &mut callback)
    }
}

struct InverterCallback {
    /// Names referenced in the current scope and the scopes already exited
    /// beneath it.
    referenced: FxHashSet<InternedString>,
    reference_stack: Vec<FxHashSet<InternedString>>,
    /// Every reference node per suffixed name. Suffixed names are unique
    /// per binding on well-formed input, so one flat map suffices.
    name_map: MultiMap<InternedString, NodeId>,
}

impl ScopedCallback for InverterCallback {
    fn enter_scope(&mut self, state: &mut TraversalState<'_>) {
        if state.in_global_scope() {
            return;
        }
        self.reference_stack.push(std::mem::take(&mut self.referenced));
    }

    fn exit_scope(&mut self, state: &mut TraversalState<'_>) {
        if state.in_global_scope() {
            return;
        }
        let scope = state.current_scope();
        let vars: Vec<InternedString> = state
            .scopes
            .vars_in_order(scope)
            .map(|v| state.scopes.var(v).name)
            .collect();
        for name in vars {
            self.handle_scope_var(state.ast, name);
        }

        // Names referenced below stay visible to the enclosing scopes,
        // except across the global boundary.
        let current = std::mem::replace(
            &mut self.referenced,
            self.reference_stack.pop().expect("reference stack"),
        );
        if !self.reference_stack.is_empty() {
            self.referenced.extend(current);
        }
    }

    fn visit(&mut self, state: &mut TraversalState<'_>, node: NodeId) {
        if state.in_global_scope() {
            return;
        }
        if !is_reference_name(state.ast, node) {
            return;
        }
        let name = state.ast.string(node).expect("name payload");
        self.referenced.insert(name);
        if state.ast.text(node).contains(UNIQUE_NAME_SEPARATOR) {
            self.name_map.insert(name, node);
        }
    }
}

impl InverterCallback {
    /// Decide whether this binding's suffix can be dropped, and renumber
    /// its references if so.
    fn handle_scope_var(&mut self, ast: &mut Ast, name: InternedString) {
        let text = ast.interner().resolve(name).to_string();
        let Some(index) = text.rfind(UNIQUE_NAME_SEPARATOR) else {
            return;
        };
        let base = &text[..index];
        if base.is_empty() {
            return;
        }

        // The search runs while the old name is still in the referenced
        // set, so a binding never renumbers onto itself.
        let replacement = self.find_replacement_name(ast, base);
        self.referenced.remove(&name);
        let replacement_key = ast.interner().intern(&replacement);
        self.referenced.insert(replacement_key);
        for node in self.name_map.remove_all(&name) {
            ast.set_string_interned(node, replacement_key);
        }
    }

    /// The base name if it is free, otherwise the first `base$jscomp$K`
    /// (K renumbered from 0) that is.
    fn find_replacement_name(&self, ast: &Ast, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut next_id = 0u32;
        while !self.is_valid_name(ast, &candidate) {
            candidate = format!("{}{}{}", base, UNIQUE_NAME_SEPARATOR, next_id);
            next_id += 1;
        }
        candidate
    }

    fn is_valid_name(&self, ast: &Ast, candidate: &str) -> bool {
        if candidate == ARGUMENTS || !is_js_identifier(candidate) {
            return false;
        }
        match ast.interner().get(candidate) {
            Some(key) => !self.referenced.contains(&key),
            None => true,
        }
    }
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
