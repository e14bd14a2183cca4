//! Printer tests: paren re-derivation and output shape.

use jsnorm_ast::{Ast, InputId, LanguageMode, NodeId};
use jsnorm_core::intern::StringInterner;
use jsnorm_parser::Parser;
use jsnorm_printer::{Printer, PrinterOptions};

fn parse(source: &str) -> (Ast, NodeId) {
    let mut ast = Ast::new(StringInterner::new());
    let parser = Parser::new(&mut ast, "test.js", source, LanguageMode::Es2017);
    let (script, diagnostics) = parser.parse_script(InputId(0));
    assert!(
        !diagnostics.has_errors(),
        "parse errors in {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    (ast, script)
}

fn print(source: &str) -> String {
    let (ast, script) = parse(source);
    Printer::new(&ast).print(script)
}

fn print_compact(source: &str) -> String {
    let (ast, script) = parse(source);
    Printer::with_options(
        &ast,
        PrinterOptions {
            pretty: false,
            ..PrinterOptions::default()
        },
    )
    .print(script)
}

#[test]
fn test_grouping_survives() {
    assert!(print("(a + b) * c;").contains("(a + b) * c"));
    assert!(print("a * (b + c);").contains("a * (b + c)"));
    assert!(print("-(a + b);").contains("-(a + b)"));
    assert!(print("(a, b);").contains("a, b"));
    assert!(print("f((a, b));").contains("f((a, b))"));
    assert!(print("(a = b) + c;").contains("(a = b) + c"));
}

#[test]
fn test_right_associative_exponent() {
    assert!(print("a ** b ** c;").contains("a ** b ** c"));
    assert!(print("(a ** b) ** c;").contains("(a ** b) ** c"));
}

#[test]
fn test_function_expression_statements_are_parenthesized() {
    let out = print("(function() { return 1; })();");
    assert!(out.contains("(function() {"), "got: {}", out);
    let out = print("(function() { })();");
    assert!(out.starts_with("(function"), "got: {}", out);
}

#[test]
fn test_object_literal_arrow_body_is_parenthesized() {
    let out = print("var f = () => ({a: 1});");
    assert!(out.contains("({a: 1})"), "got: {}", out);
}

#[test]
fn test_shorthand_collapses_only_when_halves_agree() {
    assert!(print("use({x});").contains("{x}"));
    assert!(print("use({x: y});").contains("{x: y}"));
}

#[test]
fn test_string_escaping() {
    let out = print(r#"var s = 'it\'s';"#);
    assert!(out.contains(r#"'it\'s'"#), "got: {}", out);
    let out = print("var s = 'a\\nb';");
    assert!(out.contains("'a\\nb'"), "got: {}", out);
}

#[test]
fn test_optional_catch_binding() {
    let out = print("try { a(); } catch { b(); }");
    assert!(out.contains("catch {"), "got: {}", out);
}

#[test]
fn test_compact_mode_has_no_newlines() {
    let out = print_compact("if (a) { b(); } else { c(); }");
    assert!(!out.contains('\n'), "got: {:?}", out);
    // Re-parsing compact output yields the same pretty form.
    let (ast, script) = parse(&out);
    let pretty_again = Printer::new(&ast).print(script);
    assert_eq!(pretty_again, print("if (a) { b(); } else { c(); }"));
}

#[test]
fn test_new_with_call_in_callee_keeps_parens() {
    let out = print("new (factory())();");
    assert!(out.contains("new (factory())"), "got: {}", out);
}
