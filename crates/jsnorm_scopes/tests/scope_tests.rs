//! Scope builder integration tests: parse real sources, build scopes, and
//! check where bindings land.

use jsnorm_ast::{Ast, InputId, LanguageMode, NodeId, Token};
use jsnorm_core::intern::StringInterner;
use jsnorm_core::text::TextSpan;
use jsnorm_parser::Parser;
use jsnorm_scopes::{
    RedeclarationHandler, ScopeError, ScopeId, ScopeKind, Scopes, SyntacticScopeCreator,
};
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;

fn parse(source: &str) -> (Ast, NodeId) {
    let mut ast = Ast::new(StringInterner::new());
    let root = ast.new_node(Token::Root, TextSpan::empty(0));
    let parser = Parser::new(&mut ast, "test.js", source, LanguageMode::Es2017);
    let (script, diagnostics) = parser.parse_script(InputId(0));
    assert!(
        !diagnostics.has_errors(),
        "parse errors in {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    ast.append_child(root, script);
    (ast, root)
}

/// First node with the given token, in pre-order.
fn find_first(ast: &Ast, root: NodeId, token: Token) -> Option<NodeId> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if ast.token(node) == token {
            return Some(node);
        }
        let children: Vec<_> = ast.children(node).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    None
}

fn names(ast: &Ast, scopes: &Scopes, scope: ScopeId) -> Vec<String> {
    scopes
        .vars_in_order(scope)
        .map(|v| ast.interner().resolve(scopes.var(v).name).to_string())
        .collect()
}

#[derive(Default)]
struct RecordingHandler {
    seen: Rc<RefCell<Vec<String>>>,
}

impl RedeclarationHandler for RecordingHandler {
    fn on_redeclaration(
        &mut self,
        _scopes: &Scopes,
        _scope: ScopeId,
        name: &str,
        _node: NodeId,
        _input: Option<jsnorm_ast::InputId>,
    ) {
        self.seen.borrow_mut().push(name.to_string());
    }
}

// ============================================================================
// Global scope
// ============================================================================

#[test]
fn test_global_scope_collects_top_level_declarations() {
    let (ast, root) = parse("var a; let b; const c = 0; function d(){} class E {}");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    assert_eq!(scopes.kind(global), ScopeKind::Global);
    assert_eq!(names(&ast, &scopes, global), vec!["a", "b", "c", "d", "E"]);
}

#[test]
fn test_vars_hoist_out_of_blocks_but_lets_do_not() {
    let (ast, root) = parse("if (x) { var a; let b; { var c; } }");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    assert_eq!(names(&ast, &scopes, global), vec!["a", "c"]);
}

#[test]
fn test_block_scoped_functions_stay_in_their_block() {
    let (ast, root) = parse("if (x) { function f(){} }");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    assert!(names(&ast, &scopes, global).is_empty());

    // The if-body block owns the declaration.
    let script = ast.first_child(root).unwrap();
    let if_node = find_first(&ast, script, Token::If).unwrap();
    let block = ast.second_child(if_node).unwrap();
    let block_scope = creator
        .create_scope(&ast, &mut scopes, block, Some(global))
        .expect("block scope");
    assert_eq!(scopes.kind(block_scope), ScopeKind::Block);
    assert_eq!(names(&ast, &scopes, block_scope), vec!["f"]);
}

// ============================================================================
// Function scopes
// ============================================================================

#[test]
fn test_function_scope_holds_params_and_expression_name() {
    let (ast, root) = parse("var fn = function f(a, b){var c;};");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");

    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");
    assert_eq!(scopes.kind(fn_scope), ScopeKind::Function);
    assert_eq!(names(&ast, &scopes, fn_scope), vec!["f", "a", "b"]);

    let body = ast.third_child(function).unwrap();
    let body_scope = creator
        .create_scope(&ast, &mut scopes, body, Some(fn_scope))
        .expect("body scope");
    assert_eq!(scopes.kind(body_scope), ScopeKind::FunctionBlock);
    assert_eq!(names(&ast, &scopes, body_scope), vec!["c"]);
}

#[test]
fn test_declaration_name_is_not_bled_into_the_function_scope() {
    let (ast, root) = parse("function f(a){}");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");
    assert_eq!(names(&ast, &scopes, fn_scope), vec!["a"]);
}

#[test]
fn test_destructured_params_are_flattened() {
    let (ast, root) = parse("var fn = function({a, b: [c]}, ...d){};");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");
    assert_eq!(names(&ast, &scopes, fn_scope), vec!["a", "c", "d"]);
}

#[test]
fn test_param_shadowing_is_routed_to_the_handler() {
    let (ast, root) = parse("var fn = function(x){var x; var y;};");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut creator = SyntacticScopeCreator::with_redeclaration_handler(Box::new(
        RecordingHandler { seen: seen.clone() },
    ));
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");
    let body = ast.third_child(function).unwrap();
    let body_scope = creator
        .create_scope(&ast, &mut scopes, body, Some(fn_scope))
        .expect("body scope");

    // `var x` resolves to the parameter; only `y` is declared in the body.
    assert_eq!(names(&ast, &scopes, body_scope), vec!["y"]);
    assert_eq!(seen.borrow().as_slice(), &["x".to_string()]);
}

#[test]
fn test_arguments_shadow_is_routed_to_the_handler() {
    let (ast, root) = parse("var fn = function(){var arguments;};");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut creator = SyntacticScopeCreator::with_redeclaration_handler(Box::new(
        RecordingHandler { seen: seen.clone() },
    ));
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");
    let body = ast.third_child(function).unwrap();
    let body_scope = creator
        .create_scope(&ast, &mut scopes, body, Some(fn_scope))
        .expect("body scope");
    assert!(names(&ast, &scopes, body_scope).is_empty());
    assert_eq!(seen.borrow().as_slice(), &["arguments".to_string()]);
}

// ============================================================================
// Catch scopes
// ============================================================================

#[test]
fn test_catch_scope_holds_the_binding_and_body_lets() {
    let (ast, root) = parse("try {} catch (e) { let x; var v; }");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    // `var v` hoists out of the catch to the global scope.
    assert_eq!(names(&ast, &scopes, global), vec!["v"]);

    let try_node = find_first(&ast, root, Token::Try).unwrap();
    let holder = ast.second_child(try_node).unwrap();
    let catch_scope = creator
        .create_scope(&ast, &mut scopes, holder, Some(global))
        .expect("catch scope");
    assert_eq!(scopes.kind(catch_scope), ScopeKind::Catch);
    assert_eq!(names(&ast, &scopes, catch_scope), vec!["e", "x"]);
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_module_body_is_not_part_of_the_global_scope() {
    let (ast, root) = parse("import {a as b} from 'm'; var c; function d(){}");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    assert!(names(&ast, &scopes, global).is_empty());

    let module_body = find_first(&ast, root, Token::ModuleBody).unwrap();
    let module_scope = creator
        .create_scope(&ast, &mut scopes, module_body, Some(global))
        .expect("module scope");
    assert_eq!(scopes.kind(module_scope), ScopeKind::Module);
    assert_eq!(names(&ast, &scopes, module_scope), vec!["b", "c", "d"]);
}

#[test]
fn test_import_star_declares_the_local_name() {
    let (ast, root) = parse("import * as ns from 'm';");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let module_body = find_first(&ast, root, Token::ModuleBody).unwrap();
    let module_scope = creator
        .create_scope(&ast, &mut scopes, module_body, Some(global))
        .expect("module scope");
    assert_eq!(names(&ast, &scopes, module_scope), vec!["ns"]);
}

// ============================================================================
// Change roots
// ============================================================================

#[test]
fn test_change_roots_skip_other_scripts() {
    let mut ast = Ast::new(StringInterner::new());
    let root = ast.new_node(Token::Root, TextSpan::empty(0));
    let parser = Parser::new(&mut ast, "one.js", "var a;", LanguageMode::Es2017);
    let (script1, _) = parser.parse_script(InputId(0));
    ast.append_child(root, script1);
    let parser = Parser::new(&mut ast, "two.js", "var b;", LanguageMode::Es2017);
    let (script2, _) = parser.parse_script(InputId(1));
    ast.append_child(root, script2);

    let mut creator = SyntacticScopeCreator::new();
    let mut change_roots = FxHashSet::default();
    change_roots.insert(script2);
    creator.set_change_roots(change_roots);

    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    assert_eq!(names(&ast, &scopes, global), vec!["b"]);
}

// ============================================================================
// Lookup and errors
// ============================================================================

#[test]
fn test_slot_walks_the_scope_chain() {
    let (ast, root) = parse("var a; var fn = function(b){};");
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let global = creator
        .create_scope(&ast, &mut scopes, root, None)
        .expect("global scope");
    let function = find_first(&ast, root, Token::Function).unwrap();
    let fn_scope = creator
        .create_scope(&ast, &mut scopes, function, Some(global))
        .expect("function scope");

    let a = ast.interner().get("a").unwrap();
    let b = ast.interner().get("b").unwrap();
    assert!(scopes.own_slot(fn_scope, a).is_none());
    let from_chain = scopes.slot(fn_scope, a).expect("found through parent");
    assert_eq!(scopes.var(from_chain).scope, global);
    assert!(scopes.slot(fn_scope, b).is_some());
}

#[test]
fn test_illegal_scope_root_is_an_error() {
    let (ast, root) = parse("a + b;");
    let script = ast.first_child(root).unwrap();
    let expr_result = ast.first_child(script).unwrap();
    let mut creator = SyntacticScopeCreator::new();
    let mut scopes = Scopes::new();
    let result = creator.create_scope(&ast, &mut scopes, expr_result, None);
    assert_eq!(result.unwrap_err(), ScopeError::IllegalScopeRoot(Token::ExprResult));
}
