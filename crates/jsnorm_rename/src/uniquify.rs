//! The forward renaming pass.
//!
//! Two naming policies share one scoped traversal. The contextual policy
//! renames a binding only when its name was already used somewhere earlier
//! in the traversal, numbering per name with a usage multiset that is never
//! rolled back; global bindings reserve their name but are never renamed.
//! The inline policy mints a fresh suffixed name for every declaration.
//!
//! Frames do not map one-to-one onto scopes: a function contributes a name
//! frame (its bleeding expression name) plus a parameter frame that also
//! receives the names hoisted out of its body, so a `var` that redeclares a
//! parameter resolves to the parameter's replacement instead of minting a
//! new one.

use crate::convention::CodingConvention;
use jsnorm_ast::util::{
    creates_block_scope, is_class_declaration, is_control_structure, is_function_declaration,
    is_reference_name, is_statement_block, lhs_nodes_of_declaration,
};
use jsnorm_ast::{Ast, NodeFlags, NodeId, Token};
use jsnorm_core::intern::{InternedString, StringInterner};
use jsnorm_core::unique::UniqueIdSupplier;
use jsnorm_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use jsnorm_scopes::{
    DeclarationKind, RedeclarationHandler, ScopeError, ScopeId, ScopeKind, ScopedCallback,
    ScopedTraversal, Scopes, SyntacticScopeCreator, TraversalState,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// The separator between a base name and its uniqueness suffix.
pub const UNIQUE_NAME_SEPARATOR: &str = "$jscomp$";

const ARGUMENTS: &str = "arguments";

/// The naming policy.
enum Policy {
    Contextual {
        /// Usage counts per name across the whole traversal. Never
        /// decremented: sibling scopes must not reuse each other's names.
        usage: FxHashMap<InternedString, u32>,
    },
    Inline {
        convention: Box<dyn CodingConvention>,
        supplier: UniqueIdSupplier,
        prefix: String,
        remove_const: bool,
    },
}

impl Policy {
    fn strip_const_if_replaced(&self) -> bool {
        matches!(self, Policy::Inline { remove_const: true, .. })
    }
}

/// The forward pass. Construct with [`contextual`](NameUniquifier::contextual)
/// or [`inline`](NameUniquifier::inline), then [`process`](NameUniquifier::process)
/// a tree.
pub struct NameUniquifier {
    policy: Policy,
}

impl NameUniquifier {
    /// The collision-avoiding strategy: first use of a name keeps it.
    pub fn contextual() -> Self {
        Self {
            policy: Policy::Contextual {
                usage: FxHashMap::default(),
            },
        }
    }

    /// The unconditional strategy: every declaration gets a fresh suffix
    /// drawn from `supplier`.
    pub fn inline(
        convention: Box<dyn CodingConvention>,
        supplier: UniqueIdSupplier,
        prefix: impl Into<String>,
        remove_const: bool,
    ) -> Self {
        Self {
            policy: Policy::Inline {
                convention,
                supplier,
                prefix: prefix.into(),
                remove_const,
            },
        }
    }

    pub fn process(&mut self, ast: &mut Ast, root: NodeId) -> Result<(), ScopeError> {
        let mut creator = SyntacticScopeCreator::new();
        self.process_with(&mut creator, ast, root)
    }

    /// Run with a caller-configured scope creator (redeclaration handler,
    /// change roots).
    pub fn process_with(
        &mut self,
        creator: &mut SyntacticScopeCreator,
        ast: &mut Ast,
        root: NodeId,
    ) -> Result<(), ScopeError> {
        debug!(inline = matches!(self.policy, Policy::Inline { .. }), "uniquifying declared names");
        let mut callback = RenamerCallback {
            policy: &mut self.policy,
            frames: Vec::new(),
            frames_per_scope: Vec::new(),
        };
        ScopedTraversal::new(ast, creator).traverse(root, &mut callback)
    }
}

/// One level of name replacements. A name maps to `None` when it is
/// declared here but kept, so lookup stops at the declaring frame.
struct Frame {
    global: bool,
    hoist_target: bool,
    decls: FxHashMap<InternedString, Option<InternedString>>,
}

impl Frame {
    fn new(global: bool, hoist_target: bool) -> Self {
        Self {
            global,
            hoist_target,
            decls: FxHashMap::default(),
        }
    }
}

struct RenamerCallback<'p> {
    policy: &'p mut Policy,
    frames: Vec<Frame>,
    /// How many frames each active scope pushed, for symmetric popping.
    frames_per_scope: Vec<usize>,
}

impl ScopedCallback for RenamerCallback<'_> {
    fn enter_scope(&mut self, state: &mut TraversalState<'_>) {
        let scope = state.current_scope();
        let kind = state.scopes.kind(scope);
        let root = state.scopes.root_node(scope);
        let pushed = match kind {
            ScopeKind::Global => {
                self.frames.push(Frame::new(true, true));
                let frame = self.frames.len() - 1;
                self.scan_region(state.ast, root, frame, true);
                1
            }
            ScopeKind::Module => {
                self.frames.push(Frame::new(false, true));
                let frame = self.frames.len() - 1;
                self.reserve_module_externals(state.ast, root);
                self.scan_region(state.ast, root, frame, true);
                1
            }
            ScopeKind::Function => {
                // Only the bleeding expression name; parameters get their
                // own frame when the param list is reached.
                self.frames.push(Frame::new(false, false));
                let frame = self.frames.len() - 1;
                self.add_scope_bindings(state, scope, frame, |kind| {
                    matches!(kind, DeclarationKind::Function | DeclarationKind::Class)
                });
                1
            }
            ScopeKind::FunctionBlock => {
                // The body shares the parameter frame; its hoisted names
                // route there through the frame chain.
                self.scan_region(state.ast, root, self.frames.len() - 1, true);
                0
            }
            ScopeKind::ClassBody | ScopeKind::Block | ScopeKind::For | ScopeKind::Catch => {
                self.frames.push(Frame::new(false, false));
                let frame = self.frames.len() - 1;
                self.add_scope_bindings(state, scope, frame, |_| true);
                1
            }
        };
        self.frames_per_scope.push(pushed);
    }

    fn exit_scope(&mut self, _state: &mut TraversalState<'_>) {
        let pushed = self.frames_per_scope.pop().expect("frame bookkeeping");
        for _ in 0..pushed {
            self.frames.pop();
        }
    }

    fn visit(&mut self, state: &mut TraversalState<'_>, node: NodeId) {
        if state.ast.token(node) == Token::ParamList {
            // The parameter frame opens here so that a bleeding function
            // name stays resolvable to its own (outer) frame. Parameters
            // are taken from the syntax: a parameter that collides with the
            // function's own name never makes it into the scope's binding
            // table, yet still shadows it.
            self.frames.push(Frame::new(false, true));
            let frame = self.frames.len() - 1;
            let params: Vec<InternedString> = lhs_nodes_of_declaration(state.ast, node)
                .into_iter()
                .filter_map(|lhs| state.ast.string(lhs))
                .collect();
            for name in params {
                self.add_declared_name(state.ast.interner(), frame, name);
            }
            *self.frames_per_scope.last_mut().expect("active scope") += 1;
            return;
        }

        if !is_reference_name(state.ast, node) {
            return;
        }
        let name = state.ast.string(node).expect("name payload");
        for frame in self.frames.iter().rev() {
            if let Some(entry) = frame.decls.get(&name) {
                if let Some(replacement) = entry {
                    if self.policy.strip_const_if_replaced() {
                        state.ast.remove_flags(node, NodeFlags::IS_CONSTANT_NAME);
                    }
                    state.ast.set_string_interned(node, *replacement);
                }
                return;
            }
        }
    }
}

impl RenamerCallback<'_> {
    /// Feed a scope's own bindings (filtered by declaration kind) into a
    /// frame, in declaration order.
    fn add_scope_bindings(
        &mut self,
        state: &TraversalState<'_>,
        scope: ScopeId,
        frame: usize,
        filter: impl Fn(DeclarationKind) -> bool,
    ) {
        let vars: Vec<InternedString> = state
            .scopes
            .vars_in_order(scope)
            .filter(|&v| filter(state.scopes.var(v).kind))
            .map(|v| state.scopes.var(v).name)
            .collect();
        for name in vars {
            self.add_declared_name(state.ast.interner(), frame, name);
        }
    }

    /// Register a declaration in a frame, minting a replacement according
    /// to the policy.
    fn add_declared_name(&mut self, interner: &StringInterner, frame: usize, name: InternedString) {
        let text = interner.resolve(name).to_string();
        if text == ARGUMENTS || text.is_empty() {
            return;
        }
        match &mut *self.policy {
            Policy::Contextual { usage } => {
                if self.frames[frame].global {
                    // Reserve without renaming: later locals of this name
                    // start numbering at 1.
                    let count = usage.entry(name).or_insert(0);
                    if *count == 0 {
                        *count = 1;
                    }
                    return;
                }
                if self.frames[frame].decls.contains_key(&name) {
                    return;
                }
                let count = usage.entry(name).or_insert(0);
                let id = *count;
                *count += 1;
                let replacement = if id != 0 {
                    Some(interner.intern(&format!("{}{}{}", text, UNIQUE_NAME_SEPARATOR, id)))
                } else {
                    None
                };
                self.frames[frame].decls.insert(name, replacement);
            }
            Policy::Inline {
                convention,
                supplier,
                prefix,
                ..
            } => {
                if self.frames[frame].decls.contains_key(&name) {
                    return;
                }
                let base = match text.rfind(UNIQUE_NAME_SEPARATOR) {
                    Some(index) => &text[..index],
                    None => text.as_str(),
                };
                let base = if convention.is_exported_local(base) {
                    format!("JSCompiler_{}", base)
                } else {
                    base.to_string()
                };
                let minted = format!(
                    "{}{}{}{}",
                    base,
                    UNIQUE_NAME_SEPARATOR,
                    prefix,
                    supplier.next_id()
                );
                let replacement = interner.intern(&minted);
                self.frames[frame].decls.insert(name, Some(replacement));
            }
        }
    }

    /// Register a declaration in the nearest hoist-target frame.
    fn add_hoisted_name(&mut self, interner: &StringInterner, name: InternedString) {
        let frame = self
            .frames
            .iter()
            .rposition(|f| f.hoist_target)
            .expect("a hoist frame is always active");
        self.add_declared_name(interner, frame, name);
    }

    /// Collect declarations in the statement region of a hoist scope, in
    /// source order: `var`s and function declarations from the whole region
    /// (nested blocks included), block-level declarations only from the
    /// region root's own level. Function declarations feed both the hoist
    /// frame and, at root level, the region's frame; the two adds collapse
    /// when those frames coincide.
    fn scan_region(&mut self, ast: &Ast, node: NodeId, frame: usize, at_root: bool) {
        match ast.token(node) {
            Token::Var => {
                for lhs in lhs_nodes_of_declaration(ast, node) {
                    let name = ast.string(lhs).expect("name payload");
                    self.add_hoisted_name(ast.interner(), name);
                }
                return;
            }
            Token::Let | Token::Const => {
                if at_root {
                    for lhs in lhs_nodes_of_declaration(ast, node) {
                        let name = ast.string(lhs).expect("name payload");
                        self.add_declared_name(ast.interner(), frame, name);
                    }
                }
                return;
            }
            Token::Import => {
                if at_root {
                    for lhs in lhs_nodes_of_declaration(ast, node) {
                        let name = ast.string(lhs).expect("name payload");
                        self.add_declared_name(ast.interner(), frame, name);
                    }
                }
                return;
            }
            Token::Function => {
                if is_function_declaration(ast, node) {
                    let name_node = ast.first_child(node).expect("function name");
                    if !ast.text(name_node).is_empty() {
                        let name = ast.string(name_node).expect("name payload");
                        self.add_hoisted_name(ast.interner(), name);
                        if at_root {
                            self.add_declared_name(ast.interner(), frame, name);
                        }
                    }
                }
                return;
            }
            Token::Arrow => return,
            Token::Class => {
                if is_class_declaration(ast, node) && at_root {
                    let name_node = ast.first_child(node).expect("class name");
                    if !ast.text(name_node).is_empty() {
                        let name = ast.string(name_node).expect("name payload");
                        self.add_declared_name(ast.interner(), frame, name);
                    }
                }
                return;
            }
            _ => {}
        }

        if !(is_statement_block(ast, node)
            || is_control_structure(ast, node)
            || ast.token(node) == Token::Export)
        {
            return;
        }
        for child in ast.children(node) {
            let child_at_root = at_root
                && !creates_block_scope(ast, child)
                && ast.token(child) != Token::ModuleBody;
            self.scan_region(ast, child, frame, child_at_root);
        }
    }

    /// Names pinned by `export {x as ext}` / `import {ext as x}` clauses
    /// count as used before the module's own declarations are numbered.
    fn reserve_module_externals(&mut self, ast: &Ast, module_body: NodeId) {
        let Policy::Contextual { usage } = &mut *self.policy else {
            return;
        };
        for stmt in ast.children(module_body) {
            let specs = match ast.token(stmt) {
                Token::Import => ast.second_child(stmt),
                Token::Export => ast.first_child(stmt),
                _ => None,
            };
            let Some(specs) = specs else { continue };
            let external_of = |spec: NodeId| match ast.token(stmt) {
                Token::Import => ast.first_child(spec),
                _ => ast.second_child(spec),
            };
            if matches!(ast.token(specs), Token::ImportSpecs | Token::ExportSpecs) {
                for spec in ast.children(specs) {
                    if let Some(external) = external_of(spec) {
                        if let Some(name) = ast.string(external) {
                            let count = usage.entry(name).or_insert(0);
                            if *count == 0 {
                                *count = 1;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A redeclaration handler that surfaces duplicates as warnings, for hosts
/// that want visibility instead of the default silence.
pub struct ReportingRedeclarationHandler {
    diagnostics: Rc<RefCell<DiagnosticCollection>>,
}

impl ReportingRedeclarationHandler {
    pub fn new() -> (Self, Rc<RefCell<DiagnosticCollection>>) {
        let diagnostics = Rc::new(RefCell::new(DiagnosticCollection::new()));
        (
            Self {
                diagnostics: diagnostics.clone(),
            },
            diagnostics,
        )
    }
}

impl RedeclarationHandler for ReportingRedeclarationHandler {
    fn on_redeclaration(
        &mut self,
        _scopes: &Scopes,
        _scope: ScopeId,
        name: &str,
        _node: NodeId,
        _input: Option<jsnorm_ast::InputId>,
    ) {
        self.diagnostics
            .borrow_mut()
            .add(Diagnostic::new(&messages::REDECLARATION_OF_0, &[name]));
    }
}
