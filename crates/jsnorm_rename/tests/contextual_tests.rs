//! Contextual (collision-avoiding) renaming.
//!
//! Each case parses a source, runs the contextual renamer, prints the
//! result, and compares it against the re-parsed expected output so that
//! formatting never affects the comparison.

use jsnorm_ast::{Ast, InputId, LanguageMode, NodeId, Token};
use jsnorm_core::intern::StringInterner;
use jsnorm_core::text::TextSpan;
use jsnorm_parser::Parser;
use jsnorm_printer::Printer;
use jsnorm_rename::NameUniquifier;

fn parse_program(ast: &mut Ast, source: &str) -> (NodeId, NodeId) {
    let root = ast.new_node(Token::Root, TextSpan::empty(0));
    let parser = Parser::new(ast, "test.js", source, LanguageMode::Es2017);
    let (script, diagnostics) = parser.parse_script(InputId(0));
    assert!(
        !diagnostics.has_errors(),
        "parse errors in {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    ast.append_child(root, script);
    (root, script)
}

fn normalize(source: &str) -> String {
    let mut ast = Ast::new(StringInterner::new());
    let (_, script) = parse_program(&mut ast, source);
    Printer::new(&ast).print(script)
}

fn rename(source: &str) -> String {
    let mut ast = Ast::new(StringInterner::new());
    let (root, script) = parse_program(&mut ast, source);
    NameUniquifier::contextual()
        .process(&mut ast, root)
        .expect("rename succeeds");
    Printer::new(&ast).print(script)
}

fn check(source: &str, expected: &str) {
    assert_eq!(rename(source), normalize(expected), "renaming {:?}", source);
}

fn check_same(source: &str) {
    check(source, source);
}

fn in_function(body: &str) -> String {
    format!("function f(){{{}}}", body)
}

// ============================================================================
// Globals
// ============================================================================

#[test]
fn test_global_names_are_untouched() {
    check_same("var a;");
    check_same("let a;");
    check_same("const a = 0;");
    check_same("a;");
    check_same("var extern1 = extern1 || {};");
}

// ============================================================================
// Locals
// ============================================================================

#[test]
fn test_local_names_are_made_unique() {
    check(
        "var a;function foo(a){var b;a}",
        "var a;function foo(a$jscomp$1){var b;a$jscomp$1}",
    );
    check(
        "var a;function foo(){var b;a}function boo(){var b;a}",
        "var a;function foo(){var b;a}function boo(){var b$jscomp$1;a}",
    );
    check(
        "function foo(a){var b} function boo(a){var b}",
        "function foo(a){var b} function boo(a$jscomp$1){var b$jscomp$1}",
    );
    // A name declared only once keeps its name.
    check(
        "let a;function foo(a){let b;a}",
        "let a;function foo(a$jscomp$1){let b;a$jscomp$1}",
    );
    check(
        "let a;function foo(){let b;a}function boo(){let b;a}",
        "let a;function foo(){let b;a}function boo(){let b$jscomp$1;a}",
    );
    check(
        "function foo(a){let b} function boo(a){let b}",
        "function foo(a){let b} function boo(a$jscomp$1){let b$jscomp$1}",
    );
}

#[test]
fn test_function_expression_names_are_renamed() {
    check(
        "var a = function foo(){foo()};var b = function foo(){foo()};",
        "var a = function foo(){foo()};var b = function foo$jscomp$1(){foo$jscomp$1()};",
    );
    check(
        "let a = function foo(){foo()};let b = function foo(){foo()};",
        "let a = function foo(){foo()};let b = function foo$jscomp$1(){foo$jscomp$1()};",
    );
}

// ============================================================================
// Catch scopes
// ============================================================================

#[test]
fn test_catch_names_are_made_unique() {
    check_same("try { } catch(e) {e;}");
    check(
        "try { } catch(e) {e;}; try { } catch(e) {e;}",
        "try { } catch(e) {e;}; try { } catch(e$jscomp$1) {e$jscomp$1;}",
    );
    check(
        "try { } catch(e) {e; try { } catch(e) {e;}};",
        "try { } catch(e) {e; try { } catch(e$jscomp$1) {e$jscomp$1;} };",
    );
}

#[test]
fn test_catch_names_in_function() {
    check(
        &in_function("var e; try { } catch(e) {e;}; try { } catch(e) {e;}"),
        &in_function("var e; try { } catch(e$jscomp$1) {e$jscomp$1;}; try { } catch(e$jscomp$2) {e$jscomp$2;}"),
    );
    check(
        &in_function("var e; try { } catch(e) {e; try { } catch(e) {e;}}"),
        &in_function("var e; try { } catch(e$jscomp$1) {e$jscomp$1; try { } catch(e$jscomp$2) {e$jscomp$2;} }"),
    );
    // The var is hoisted ahead of the catch clauses, wherever it appears.
    check(
        &in_function("try { } catch(e) {e;}; try { } catch(e) {e;} var e;"),
        &in_function("try { } catch(e$jscomp$1) {e$jscomp$1;}; try { } catch(e$jscomp$2) {e$jscomp$2;} var e;"),
    );
    check(
        &in_function("try { } catch(e) {e; try { } catch(e) {e;}} var e;"),
        &in_function("try { } catch(e$jscomp$1) {e$jscomp$1; try { } catch(e$jscomp$2) {e$jscomp$2;} } var e;"),
    );
}

// ============================================================================
// Names shadowing the function's own name
// ============================================================================

#[test]
fn test_var_shadowing_function_name() {
    check(
        "function f(){var f; f = 1}",
        "function f(){var f$jscomp$1; f$jscomp$1 = 1}",
    );
    check(
        "function f(f){f = 1}",
        "function f(f$jscomp$1){f$jscomp$1 = 1}",
    );
    check(
        "function f(f){var f; f = 1}",
        "function f(f$jscomp$1){var f$jscomp$1; f$jscomp$1 = 1}",
    );
}

#[test]
fn test_var_shadowing_function_expression_name() {
    check(
        "var fn = function f(){var f; f = 1}",
        "var fn = function f(){var f$jscomp$1; f$jscomp$1 = 1}",
    );
    check(
        "var fn = function f(f){f = 1}",
        "var fn = function f(f$jscomp$1){f$jscomp$1 = 1}",
    );
    check(
        "var fn = function f(f){var f; f = 1}",
        "var fn = function f(f$jscomp$1){var f$jscomp$1; f$jscomp$1 = 1}",
    );
}

#[test]
fn test_duplicate_function_declarations_are_left_alone() {
    check_same("function f(){} function f(){}");
    check_same("var x = function() {function f(){} function f(){}};");
}

// ============================================================================
// arguments
// ============================================================================

#[test]
fn test_arguments_is_never_renamed() {
    check_same("function foo(){var arguments;function bar(){var arguments;}}");
}

// ============================================================================
// Block-scoped declarations
// ============================================================================

#[test]
fn test_class_in_for_loop() {
    check_same("for (class a {};;) { break; }");
}

#[test]
fn test_function_in_for_loop() {
    check_same("for (function a() {};;) { break; }");
}

#[test]
fn test_lets_in_separate_blocks() {
    check(
        "if (x) { let e; alert(e); } if (y) { let e; alert(e); }",
        "if (x) { let e; alert(e); } if (y) { let e$jscomp$1; alert(e$jscomp$1); }",
    );
}

#[test]
fn test_const_in_global_hoist_scope() {
    check_same("if (true) { const x = 1; alert(x); }");
    check(
        "if (true) { const x = 1; alert(x); } else { const x = 1; alert(x); }",
        "if (true) { const x = 1; alert(x); } else { const x$jscomp$1 = 1; alert(x$jscomp$1); }",
    );
}

#[test]
fn test_block_scopes() {
    check(
        "{let a; { let a; }}",
        "{let a; { let a$jscomp$1; }}",
    );
    // Function declarations are block-scoped.
    check(
        "function foo() { function bar() { return 1; } } function boo() { function bar() { return 2; } }",
        "function foo() { function bar() { return 1; } } function boo() { function bar$jscomp$1() { return 2; } }",
    );
    check(
        "function foo() { function bar() { return 1; } if (true) { function bar() { return 2; } } }",
        "function foo() { function bar() { return 1; } if (true) { function bar$jscomp$1() { return 2; } } }",
    );
}

#[test]
fn test_var_hoisted_from_block_conflicts_across_functions() {
    check(
        "var f1=function(){var x};(function() { function f2() { alert(x) } { var x=0 } f2() })()",
        "var f1=function(){var x};(function() { function f2() { alert(x$jscomp$1) } { var x$jscomp$1=0 } f2() })()",
    );
}

#[test]
fn test_block_scoped_function_shadowing_global_reference() {
    check(
        "if (true) { function f(){}; } f();",
        "if (true) { function f$jscomp$1(){}; } f();",
    );
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_members() {
    check(
        "var a; class Foo { constructor(a) { this.a = a; } f() { var x = 1; return a + x; } }",
        "var a; class Foo { constructor(a$jscomp$1) { this.a = a$jscomp$1; } f() { var x = 1; return a + x; } }",
    );
    // Class declarations are block-scoped but not hoisted.
    check_same("{ let x = new Foo(); class Foo {} }");
}

// ============================================================================
// Recursion, arrows, defaults, patterns
// ============================================================================

#[test]
fn test_recursive_function_keeps_name() {
    check_same("function foo(x) { return foo(x) - 1; }");
}

#[test]
fn test_arrow_functions() {
    check(
        "function foo() { var f = (x) => x; return f(1); } function boo() { var f = (x) => x; return f(2); }",
        "function foo() { var f = (x) => x; return f(1); } function boo() { var f$jscomp$1 = (x$jscomp$1) => x$jscomp$1; return f$jscomp$1(2); }",
    );
    check(
        "function foo() { var f = (x, ...y) => x + y[0]; return f(1, 2); } function boo() { var f = (x, ...y) => x + y[0]; return f(1, 2); }",
        "function foo() { var f = (x, ...y) => x + y[0]; return f(1, 2); } function boo() { var f$jscomp$1 = (x$jscomp$1, ...y$jscomp$1) => x$jscomp$1 + y$jscomp$1[0]; return f$jscomp$1(1, 2); }",
    );
}

#[test]
fn test_default_parameters() {
    check(
        "function foo(x = 1) { return x; } function boo(x = 1) { return x; }",
        "function foo(x = 1) { return x; } function boo(x$jscomp$1 = 1) { return x$jscomp$1; }",
    );
    check_same("function foo(x = 1, y = x) { return x + y; }");
}

#[test]
fn test_object_pattern_parameters() {
    check(
        "function foo({x:y}) { return y; } function boo({x:y}) { return y; }",
        "function foo({x:y}) { return y; } function boo({x:y$jscomp$1}) { return y$jscomp$1; }",
    );
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_exported_and_imported_names() {
    // The external name of a spec is pinned; the local binding is renamed
    // around it.
    check(
        "var a; export {a as a};",
        "var a$jscomp$1; export {a$jscomp$1 as a};",
    );
    check(
        "var a; import {a as a} from './bar.js'",
        "var a$jscomp$1; import {a as a$jscomp$1} from './bar.js'",
    );
}

// ============================================================================
// Shorthand object properties
// ============================================================================

#[test]
fn test_shorthand_property_reference_is_renamed() {
    check(
        "function foo(){var b; use({b});} function boo(){var b; use({b});}",
        "function foo(){var b; use({b});} function boo(){var b$jscomp$1; use({b: b$jscomp$1});}",
    );
}

#[test]
fn test_object_properties_are_untouched() {
    check(
        "function foo(){var a = {x: 1}; return a.x;} function boo(){var a = {x: 1}; return a.x;}",
        "function foo(){var a = {x: 1}; return a.x;} function boo(){var a$jscomp$1 = {x: 1}; return a$jscomp$1.x;}",
    );
}
