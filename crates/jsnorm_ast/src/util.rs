//! Structural predicates and declaration helpers over the token tree.
//!
//! These encode the positional grammar: the same token means different
//! things depending on its parent (a `Function` under a statement block is
//! a declaration, elsewhere an expression), and declarations introduce
//! names through patterns that have to be flattened to their `Name` leaves.

use crate::token::Token;
use crate::tree::{Ast, NodeId};

/// Whether `parent` is a position whose function/class children are
/// declarations rather than expressions.
fn is_declaration_parent(token: Token) -> bool {
    matches!(
        token,
        Token::Block | Token::Script | Token::ModuleBody | Token::Root | Token::Export
    )
}

pub fn is_function_declaration(ast: &Ast, n: NodeId) -> bool {
    ast.token(n) == Token::Function
        && ast
            .parent(n)
            .map(|p| is_declaration_parent(ast.token(p)))
            .unwrap_or(false)
}

pub fn is_function_expression(ast: &Ast, n: NodeId) -> bool {
    ast.token(n) == Token::Function && !is_function_declaration(ast, n)
}

pub fn is_class_declaration(ast: &Ast, n: NodeId) -> bool {
    ast.token(n) == Token::Class
        && ast
            .parent(n)
            .map(|p| is_declaration_parent(ast.token(p)))
            .unwrap_or(false)
}

pub fn is_class_expression(ast: &Ast, n: NodeId) -> bool {
    ast.token(n) == Token::Class && !is_class_declaration(ast, n)
}

/// Whether this node is a function or arrow body block.
pub fn is_function_block(ast: &Ast, n: NodeId) -> bool {
    ast.token(n) == Token::Block
        && ast
            .parent(n)
            .map(|p| matches!(ast.token(p), Token::Function | Token::Arrow))
            .unwrap_or(false)
}

/// Whether entering this node enters a new block scope. Function bodies are
/// excluded (they form the function-block scope, rooted separately), as are
/// the synthetic blocks under `case`/`default` and the catch body (both
/// share their parent's scope).
pub fn creates_block_scope(ast: &Ast, n: NodeId) -> bool {
    match ast.token(n) {
        Token::Block => ast
            .parent(n)
            .map(|p| {
                !matches!(
                    ast.token(p),
                    Token::Function
                        | Token::Arrow
                        | Token::Catch
                        | Token::Case
                        | Token::DefaultCase
                )
            })
            .unwrap_or(false),
        Token::For | Token::ForIn | Token::ForOf | Token::Switch | Token::Catch | Token::Class => {
            true
        }
        _ => false,
    }
}

/// Statement-list containers.
pub fn is_statement_block(ast: &Ast, n: NodeId) -> bool {
    matches!(
        ast.token(n),
        Token::Root | Token::Script | Token::ModuleBody | Token::Block
    )
}

/// Control structures whose children may contain statements.
pub fn is_control_structure(ast: &Ast, n: NodeId) -> bool {
    matches!(
        ast.token(n),
        Token::If
            | Token::For
            | Token::ForIn
            | Token::ForOf
            | Token::While
            | Token::Do
            | Token::Switch
            | Token::Case
            | Token::DefaultCase
            | Token::Try
            | Token::Catch
    )
}

/// Whether `n` is the external half of `import {ext as local}` or
/// `export {local as ext}`. External names are pinned to the module wire
/// format and must never be rewritten.
pub fn is_module_export_name(ast: &Ast, n: NodeId) -> bool {
    if ast.token(n) != Token::Name {
        return false;
    }
    match ast.parent(n) {
        Some(p) if ast.token(p) == Token::ImportSpec => ast.first_child(p) == Some(n),
        Some(p) if ast.token(p) == Token::ExportSpec => ast.second_child(p) == Some(n),
        _ => false,
    }
}

/// Whether `n` names a binding or a reference to one, as opposed to a
/// property, key, or module-external name. Declaration names count.
pub fn is_reference_name(ast: &Ast, n: NodeId) -> bool {
    match ast.token(n) {
        Token::ImportStar => true,
        Token::Name => !ast.text(n).is_empty() && !is_module_export_name(ast, n),
        _ => false,
    }
}

/// Enumerate every name introduced by a declaration node, in source order.
/// Supported declarations: `var`/`let`/`const` lists, parameter lists,
/// `catch` clauses, and `import` statements. Names are flattened out of
/// object/array patterns, defaults, and rests.
pub fn lhs_nodes_of_declaration(ast: &Ast, n: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    match ast.token(n) {
        Token::Var | Token::Let | Token::Const => {
            for declarator in ast.children(n) {
                match ast.token(declarator) {
                    Token::Name => out.push(declarator),
                    Token::DestructuringLhs => {
                        if let Some(pattern) = ast.first_child(declarator) {
                            collect_binding_targets(ast, pattern, &mut out);
                        }
                    }
                    // `for (let {a} of …)` keeps the bare pattern as the
                    // declarator, with no initializer wrapper.
                    Token::ObjectPattern | Token::ArrayPattern => {
                        collect_binding_targets(ast, declarator, &mut out);
                    }
                    other => debug_assert!(false, "bad declarator token: {:?}", other),
                }
            }
        }
        Token::ParamList => {
            for param in ast.children(n) {
                collect_binding_targets(ast, param, &mut out);
            }
        }
        Token::Catch => {
            if let Some(binding) = ast.first_child(n) {
                if ast.token(binding) != Token::Empty {
                    collect_binding_targets(ast, binding, &mut out);
                }
            }
        }
        Token::Import => {
            let mut children = ast.children(n);
            if let Some(default) = children.next() {
                if ast.token(default) == Token::Name {
                    out.push(default);
                }
            }
            if let Some(specs) = children.next() {
                match ast.token(specs) {
                    Token::ImportStar => out.push(specs),
                    Token::ImportSpecs => {
                        for spec in ast.children(specs) {
                            if let Some(local) = ast.second_child(spec) {
                                out.push(local);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        other => debug_assert!(false, "not a name-introducing declaration: {:?}", other),
    }
    out
}

/// Flatten a binding target (name, pattern, default, or rest) to its names.
fn collect_binding_targets(ast: &Ast, n: NodeId, out: &mut Vec<NodeId>) {
    match ast.token(n) {
        Token::Name => out.push(n),
        Token::Empty => {}
        Token::DefaultValue | Token::Rest => {
            if let Some(target) = ast.first_child(n) {
                collect_binding_targets(ast, target, out);
            }
        }
        Token::ObjectPattern => {
            for prop in ast.children(n) {
                match ast.token(prop) {
                    Token::StringKey => {
                        if let Some(target) = ast.first_child(prop) {
                            collect_binding_targets(ast, target, out);
                        }
                    }
                    Token::ComputedProp => {
                        if let Some(target) = ast.second_child(prop) {
                            collect_binding_targets(ast, target, out);
                        }
                    }
                    Token::Rest => collect_binding_targets(ast, prop, out),
                    other => debug_assert!(false, "bad object pattern member: {:?}", other),
                }
            }
        }
        Token::ArrayPattern => {
            for element in ast.children(n) {
                collect_binding_targets(ast, element, out);
            }
        }
        other => debug_assert!(false, "bad binding target: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsnorm_core::intern::StringInterner;
    use jsnorm_core::text::TextSpan;

    fn span() -> TextSpan {
        TextSpan::empty(0)
    }

    /// Build `var {a, b: [c, ...d]} = e;` by hand and flatten its names.
    #[test]
    fn test_lhs_extraction_through_patterns() {
        let mut ast = Ast::new(StringInterner::new());
        let var = ast.new_node(Token::Var, span());
        let lhs = ast.new_node(Token::DestructuringLhs, span());
        let obj = ast.new_node(Token::ObjectPattern, span());

        let key_a = ast.new_string_node(Token::StringKey, "a", span());
        let a = ast.new_string_node(Token::Name, "a", span());
        ast.append_child(key_a, a);

        let key_b = ast.new_string_node(Token::StringKey, "b", span());
        let arr = ast.new_node(Token::ArrayPattern, span());
        let c = ast.new_string_node(Token::Name, "c", span());
        let rest = ast.new_node(Token::Rest, span());
        let d = ast.new_string_node(Token::Name, "d", span());
        ast.append_child(rest, d);
        ast.append_child(arr, c);
        ast.append_child(arr, rest);
        ast.append_child(key_b, arr);

        ast.append_child(obj, key_a);
        ast.append_child(obj, key_b);
        ast.append_child(lhs, obj);
        let init = ast.new_string_node(Token::Name, "e", span());
        ast.append_child(lhs, init);
        ast.append_child(var, lhs);

        let names = lhs_nodes_of_declaration(&ast, var);
        assert_eq!(names, vec![a, c, d]);
    }

    #[test]
    fn test_function_declaration_vs_expression() {
        let mut ast = Ast::new(StringInterner::new());
        let script = ast.new_node(Token::Script, span());
        let decl = ast.new_node(Token::Function, span());
        ast.append_child(script, decl);
        assert!(is_function_declaration(&ast, decl));
        assert!(!is_function_expression(&ast, decl));

        let expr_result = ast.new_node(Token::ExprResult, span());
        ast.append_child(script, expr_result);
        let expr = ast.new_node(Token::Function, span());
        ast.append_child(expr_result, expr);
        assert!(is_function_expression(&ast, expr));
    }

    #[test]
    fn test_module_export_name_detection() {
        let mut ast = Ast::new(StringInterner::new());
        let spec = ast.new_node(Token::ExportSpec, span());
        let local = ast.new_string_node(Token::Name, "a", span());
        let external = ast.new_string_node(Token::Name, "a", span());
        ast.append_child(spec, local);
        ast.append_child(spec, external);

        assert!(is_reference_name(&ast, local));
        assert!(!is_reference_name(&ast, external));
        assert!(is_module_export_name(&ast, external));
    }
}
