//! Parser integration tests: parse, print, and re-parse. Printing a parsed
//! tree and parsing the result again must be a fixed point.

use jsnorm_ast::util::lhs_nodes_of_declaration;
use jsnorm_ast::{Ast, InputId, LanguageMode, NodeFlags, NodeId, Token};
use jsnorm_core::intern::StringInterner;
use jsnorm_parser::Parser;
use jsnorm_printer::Printer;

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

fn check_stable(source: &str) {
    let once = print(source);
    let twice = print(&once);
    assert_eq!(once, twice, "print/parse not stable for {:?}", source);
}

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

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_statements_round_trip() {
    check_stable("var a = 1, b;");
    check_stable("let {x, y: [z = 2], ...rest} = obj;");
    check_stable("const c = 0;");
    check_stable("if (a) { b(); } else if (c) { d(); } else { e(); }");
    check_stable("for (var i = 0; i < 10; i++) { use(i); }");
    check_stable("for (let k in obj) { use(k); }");
    check_stable("for (const v of list) { use(v); }");
    check_stable("while (a) { b(); }");
    check_stable("do { a(); } while (b);");
    check_stable("switch (x) { case 1: a(); break; default: b(); }");
    check_stable("try { a(); } catch (e) { b(e); } finally { c(); }");
    check_stable("try { a(); } finally { c(); }");
    check_stable("throw new Error('boom');");
    check_stable("function f(a, b = 1, ...rest) { return a + b; }");
    check_stable("class Foo extends Bar { constructor(a) { } m() { return 1; } static s() { } }");
    check_stable(";");
}

#[test]
fn test_unbraced_bodies_are_normalized_to_blocks() {
    assert_eq!(print("if (a) b();"), print("if (a) { b(); }"));
    assert_eq!(print("while (a) b();"), print("while (a) { b(); }"));
    assert_eq!(
        print("for (;;) break;"),
        print("for (;;) { break; }")
    );
}

#[test]
fn test_modules_round_trip() {
    check_stable("import d from 'm';");
    check_stable("import * as ns from 'm';");
    check_stable("import {a as b, c as c} from 'm';");
    check_stable("import 'm';");
    check_stable("export {a as b};");
    check_stable("export var x = 1;");
    check_stable("export function f() { }");
    check_stable("export default function main() { }");
}

#[test]
fn test_module_body_is_created_only_for_modules() {
    let (ast, script) = parse("import 'm'; var a;");
    let first = ast.first_child(script).unwrap();
    assert_eq!(ast.token(first), Token::ModuleBody);

    let (ast, script) = parse("var a;");
    let first = ast.first_child(script).unwrap();
    assert_eq!(ast.token(first), Token::Var);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_expressions_round_trip() {
    check_stable("a = b + c * d;");
    check_stable("a **= b ** c ** d;");
    check_stable("a === b ? c : d;");
    check_stable("a && b || c;");
    check_stable("a ?? b;");
    check_stable("x = a.b.c[d](e, ...f);");
    check_stable("new Foo(a, b).bar();");
    check_stable("typeof a === 'string';");
    check_stable("delete a.b;");
    check_stable("a$jscomp$0++;");
    check_stable("--a;");
    check_stable("var f = (x, y) => x + y;");
    check_stable("var g = x => x * 2;");
    check_stable("var h = () => { return 1; };");
    check_stable("var o = {a: 1, 'b c': 2, [k]: 3, d, m() { return 4; }};");
    check_stable("var a = [1, , 2, ...rest];");
    check_stable("(function() { return 1; })();");
    check_stable("use(async () => 1);");
    check_stable("async function f() { await g(); }");
    check_stable("function* gen() { yield 1; }");
}

#[test]
fn test_precedence_parens_are_rederived() {
    // The tree has no paren nodes, so grouping must survive printing.
    check_stable("(a + b) * c;");
    let grouped = print("(a + b) * c;");
    let ungrouped = print("a + b * c;");
    assert_ne!(grouped, ungrouped);
    assert!(grouped.contains("(a + b) * c"));
}

#[test]
fn test_shorthand_properties_expand_to_key_value() {
    let (ast, script) = parse("use({x});");
    let key = find_first(&ast, script, Token::StringKey).unwrap();
    assert!(ast.flags(key).contains(NodeFlags::SHORTHAND));
    let value = ast.first_child(key).unwrap();
    assert_eq!(ast.token(value), Token::Name);
    assert_eq!(ast.text(value), "x");
    // Shorthand prints back as shorthand while the halves agree.
    assert!(print("use({x});").contains("{x}"));
}

#[test]
fn test_import_spec_children_are_external_then_local() {
    let (ast, script) = parse("import {a as b} from 'm';");
    let spec = find_first(&ast, script, Token::ImportSpec).unwrap();
    let external = ast.first_child(spec).unwrap();
    let local = ast.second_child(spec).unwrap();
    assert_eq!(ast.text(external), "a");
    assert_eq!(ast.text(local), "b");
}

#[test]
fn test_getprop_carries_the_property_as_payload() {
    let (ast, script) = parse("a.b;");
    let getprop = find_first(&ast, script, Token::GetProp).unwrap();
    assert_eq!(ast.text(getprop), "b");
    let object = ast.first_child(getprop).unwrap();
    assert_eq!(ast.token(object), Token::Name);
    assert_eq!(ast.text(object), "a");
    assert!(ast.next_sibling(object).is_none());
}

// ============================================================================
// Declarations feed LHS extraction
// ============================================================================

#[test]
fn test_lhs_extraction_from_parsed_patterns() {
    let (ast, script) = parse("var {a, b: {c}, d = 1} = obj, [e, , ...f] = arr;");
    let var = find_first(&ast, script, Token::Var).unwrap();
    let lhs: Vec<&str> = lhs_nodes_of_declaration(&ast, var)
        .into_iter()
        .map(|n| ast.text(n))
        .collect();
    assert_eq!(lhs, vec!["a", "c", "d", "e", "f"]);
}

// ============================================================================
// Language modes
// ============================================================================

#[test]
fn test_exponent_requires_es2016() {
    let mut ast = Ast::new(StringInterner::new());
    let parser = Parser::new(&mut ast, "test.js", "a ** b;", LanguageMode::Es2015);
    let (_, diagnostics) = parser.parse_script(InputId(0));
    assert!(diagnostics.has_errors());

    let mut ast = Ast::new(StringInterner::new());
    let parser = Parser::new(&mut ast, "test.js", "a ** b;", LanguageMode::Es2016);
    let (_, diagnostics) = parser.parse_script(InputId(0));
    assert!(!diagnostics.has_errors());
}

#[test]
fn test_async_requires_es2017() {
    let mut ast = Ast::new(StringInterner::new());
    let parser = Parser::new(&mut ast, "test.js", "async function f() { }", LanguageMode::Es2016);
    let (_, diagnostics) = parser.parse_script(InputId(0));
    assert!(diagnostics.has_errors());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_template_literals_are_rejected() {
    let mut ast = Ast::new(StringInterner::new());
    let parser = Parser::new(&mut ast, "test.js", "var a = `tpl`;", LanguageMode::Es2017);
    let (_, diagnostics) = parser.parse_script(InputId(0));
    assert!(diagnostics.has_errors());
}

#[test]
fn test_missing_semicolons_are_inserted_at_line_breaks() {
    let (ast, script) = parse("var a = 1\nvar b = 2");
    let count = ast.children(script).count();
    assert_eq!(count, 2);
    let _ = find_first(&ast, script, Token::Var).unwrap();
}
