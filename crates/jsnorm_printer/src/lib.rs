//! jsnorm_printer: AST to source text.
//!
//! Parentheses are not represented in the tree; the printer re-derives them
//! from operator precedence, and parenthesizes expression statements whose
//! leftmost token would otherwise be parsed as a declaration or block.

use jsnorm_ast::{Ast, NodeFlags, NodeId, Token};

/// Options for the printer.
pub struct PrinterOptions {
    /// Emit newlines and indentation.
    pub pretty: bool,
    /// Indentation unit used in pretty mode.
    pub indent_str: String,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_str: "  ".to_string(),
        }
    }
}

/// Precedence levels used for paren re-derivation. Higher binds tighter.
mod prec {
    pub const COMMA: u8 = 1;
    pub const ASSIGN: u8 = 2;
    pub const HOOK: u8 = 3;
    pub const UNARY: u8 = 16;
    pub const POSTFIX: u8 = 17;
    pub const CALL: u8 = 18;
    pub const PRIMARY: u8 = 20;
}

/// The printer converts a subtree back into JavaScript text.
pub struct Printer<'a> {
    ast: &'a Ast,
    output: String,
    indent_level: u32,
    options: PrinterOptions,
}

impl<'a> Printer<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self::with_options(ast, PrinterOptions::default())
    }

    pub fn with_options(ast: &'a Ast, options: PrinterOptions) -> Self {
        Self {
            ast,
            output: String::with_capacity(1024),
            indent_level: 0,
            options,
        }
    }

    /// Print a `Script`, `ModuleBody`, or `Root` node to text.
    pub fn print(mut self, node: NodeId) -> String {
        match self.ast.token(node) {
            Token::Root => {
                for script in self.ast.children(node) {
                    self.print_statement_list(script);
                }
            }
            Token::Script | Token::ModuleBody | Token::Block => {
                self.print_statement_list(node);
            }
            _ => self.print_statement(node),
        }
        self.output
    }

    fn print_statement_list(&mut self, parent: NodeId) {
        // A script that is a module prints through its module body.
        if self.ast.token(parent) == Token::Script {
            if let Some(only) = self.ast.first_child(parent) {
                if self.ast.token(only) == Token::ModuleBody {
                    self.print_statement_list(only);
                    return;
                }
            }
        }
        for stmt in self.ast.children(parent) {
            self.write_indent();
            self.print_statement(stmt);
            self.newline();
        }
    }

    // ========================================================================
    // Output primitives
    // ========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.output.push('\n');
        }
    }

    fn write_indent(&mut self) {
        if self.options.pretty {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.options.indent_str);
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn print_statement(&mut self, stmt: NodeId) {
        match self.ast.token(stmt) {
            Token::Empty => self.write(";"),
            Token::Block => self.print_block(stmt),
            Token::Var | Token::Let | Token::Const => {
                self.print_declaration_list(stmt);
                self.write(";");
            }
            Token::Function => self.print_function(stmt),
            Token::Class => self.print_class(stmt),
            Token::ExprResult => {
                let expr = self.ast.first_child(stmt).expect("expression statement");
                if starts_with_ambiguous_token(self.ast, expr) {
                    self.write("(");
                    self.print_expr(expr, prec::COMMA);
                    self.write(")");
                } else {
                    self.print_expr(expr, prec::COMMA);
                }
                self.write(";");
            }
            Token::If => self.print_if(stmt),
            Token::For => self.print_for(stmt),
            Token::ForIn | Token::ForOf => self.print_for_each(stmt),
            Token::While => {
                self.write("while (");
                let cond = self.ast.first_child(stmt).expect("while condition");
                self.print_expr(cond, prec::COMMA);
                self.write(") ");
                self.print_block(self.ast.second_child(stmt).expect("while body"));
            }
            Token::Do => {
                self.write("do ");
                self.print_block(self.ast.first_child(stmt).expect("do body"));
                self.write(" while (");
                self.print_expr(self.ast.second_child(stmt).expect("do condition"), prec::COMMA);
                self.write(");");
            }
            Token::Switch => self.print_switch(stmt),
            Token::Try => self.print_try(stmt),
            Token::Return => {
                self.write("return");
                if let Some(expr) = self.ast.first_child(stmt) {
                    self.write(" ");
                    self.print_expr(expr, prec::COMMA);
                }
                self.write(";");
            }
            Token::Throw => {
                self.write("throw ");
                let expr = self.ast.first_child(stmt).expect("throw operand");
                self.print_expr(expr, prec::COMMA);
                self.write(";");
            }
            Token::Break => self.write("break;"),
            Token::Continue => self.write("continue;"),
            Token::Import => self.print_import(stmt),
            Token::Export => self.print_export(stmt),
            other => panic!("cannot print statement token: {:?}", other),
        }
    }

    fn print_block(&mut self, block: NodeId) {
        debug_assert_eq!(self.ast.token(block), Token::Block);
        if !self.ast.has_children(block) {
            self.write("{}");
            return;
        }
        self.write("{");
        self.newline();
        self.indent_level += 1;
        for stmt in self.ast.children(block) {
            self.write_indent();
            self.print_statement(stmt);
            self.newline();
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    fn declaration_keyword(token: Token) -> &'static str {
        match token {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            _ => unreachable!("not a declaration list"),
        }
    }

    /// `var a = 1, {b} = c` without the trailing semicolon.
    fn print_declaration_list(&mut self, list: NodeId) {
        self.write(Self::declaration_keyword(self.ast.token(list)));
        self.write(" ");
        let mut first = true;
        for declarator in self.ast.children(list) {
            if !first {
                self.write(", ");
            }
            first = false;
            match self.ast.token(declarator) {
                Token::Name => {
                    self.write(self.ast.text(declarator).to_string().as_str());
                    if let Some(init) = self.ast.first_child(declarator) {
                        self.write(" = ");
                        self.print_expr(init, prec::ASSIGN);
                    }
                }
                Token::DestructuringLhs => {
                    let pattern = self.ast.first_child(declarator).expect("pattern");
                    self.print_binding_target(pattern);
                    if let Some(init) = self.ast.next_sibling(pattern) {
                        self.write(" = ");
                        self.print_expr(init, prec::ASSIGN);
                    }
                }
                Token::ObjectPattern | Token::ArrayPattern => {
                    self.print_binding_target(declarator);
                }
                other => panic!("bad declarator: {:?}", other),
            }
        }
    }

    fn print_function(&mut self, function: NodeId) {
        if self.ast.flags(function).contains(NodeFlags::ASYNC) {
            self.write("async ");
        }
        self.write("function");
        if self.ast.flags(function).contains(NodeFlags::GENERATOR) {
            self.write("*");
        }
        let name = self.ast.first_child(function).expect("function name");
        let text = self.ast.text(name).to_string();
        if !text.is_empty() {
            self.write(" ");
            self.write(&text);
        }
        let params = self.ast.second_child(function).expect("param list");
        self.print_param_list(params);
        self.write(" ");
        self.print_block(self.ast.third_child(function).expect("function body"));
    }

    fn print_class(&mut self, class: NodeId) {
        self.write("class");
        let name = self.ast.first_child(class).expect("class name");
        let text = self.ast.text(name).to_string();
        if !text.is_empty() {
            self.write(" ");
            self.write(&text);
        }
        let heritage = self.ast.second_child(class).expect("class heritage");
        if self.ast.token(heritage) != Token::Empty {
            self.write(" extends ");
            self.print_expr(heritage, prec::CALL);
        }
        self.write(" {");
        self.newline();
        self.indent_level += 1;
        let members = self.ast.third_child(class).expect("class members");
        for member in self.ast.children(members) {
            self.write_indent();
            self.print_member_function(member);
            self.newline();
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    fn print_member_function(&mut self, member: NodeId) {
        if self.ast.flags(member).contains(NodeFlags::STATIC) {
            self.write("static ");
        }
        let function = self.ast.first_child(member).expect("member function");
        if self.ast.flags(function).contains(NodeFlags::ASYNC) {
            self.write("async ");
        }
        if self.ast.flags(function).contains(NodeFlags::GENERATOR) {
            self.write("*");
        }
        self.write(self.ast.text(member).to_string().as_str());
        let params = self.ast.second_child(function).expect("param list");
        self.print_param_list(params);
        self.write(" ");
        self.print_block(self.ast.third_child(function).expect("member body"));
    }

    fn print_param_list(&mut self, params: NodeId) {
        self.write("(");
        let mut first = true;
        for param in self.ast.children(params) {
            if !first {
                self.write(", ");
            }
            first = false;
            self.print_binding_target(param);
        }
        self.write(")");
    }

    fn print_binding_target(&mut self, target: NodeId) {
        match self.ast.token(target) {
            Token::Name => self.write(self.ast.text(target).to_string().as_str()),
            Token::Empty => {}
            Token::DefaultValue => {
                let inner = self.ast.first_child(target).expect("default target");
                self.print_binding_target(inner);
                self.write(" = ");
                let init = self.ast.second_child(target).expect("default value");
                self.print_expr(init, prec::ASSIGN);
            }
            Token::Rest => {
                self.write("...");
                let inner = self.ast.first_child(target).expect("rest target");
                self.print_binding_target(inner);
            }
            Token::ObjectPattern => {
                self.write("{");
                let mut first = true;
                for member in self.ast.children(target) {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    match self.ast.token(member) {
                        Token::StringKey => self.print_pattern_key(member),
                        Token::ComputedProp => {
                            self.write("[");
                            let key = self.ast.first_child(member).expect("computed key");
                            self.print_expr(key, prec::ASSIGN);
                            self.write("]: ");
                            let value = self.ast.second_child(member).expect("computed target");
                            self.print_binding_target(value);
                        }
                        Token::Rest => self.print_binding_target(member),
                        other => panic!("bad pattern member: {:?}", other),
                    }
                }
                self.write("}");
            }
            Token::ArrayPattern => {
                self.write("[");
                let mut first = true;
                for element in self.ast.children(target) {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    self.print_binding_target(element);
                }
                self.write("]");
            }
            other => panic!("bad binding target: {:?}", other),
        }
    }

    /// One `key: target` member of an object pattern. Shorthand collapses
    /// back when the binding still matches the key.
    fn print_pattern_key(&mut self, key: NodeId) {
        let key_text = self.ast.text(key).to_string();
        let value = self.ast.first_child(key).expect("pattern key target");
        if self.ast.flags(key).contains(NodeFlags::SHORTHAND) {
            match self.ast.token(value) {
                Token::Name if self.ast.text(value) == key_text => {
                    self.write(&key_text);
                    return;
                }
                Token::DefaultValue => {
                    let target = self.ast.first_child(value).expect("default target");
                    if self.ast.token(target) == Token::Name && self.ast.text(target) == key_text {
                        self.print_binding_target(value);
                        return;
                    }
                }
                _ => {}
            }
        }
        if self.ast.flags(key).contains(NodeFlags::QUOTED) {
            self.print_quoted(&key_text);
        } else {
            self.write(&key_text);
        }
        self.write(": ");
        self.print_binding_target(value);
    }

    fn print_if(&mut self, stmt: NodeId) {
        self.write("if (");
        let cond = self.ast.first_child(stmt).expect("if condition");
        self.print_expr(cond, prec::COMMA);
        self.write(") ");
        self.print_block(self.ast.second_child(stmt).expect("if body"));
        if let Some(else_branch) = self.ast.third_child(stmt) {
            self.write(" else ");
            if self.ast.token(else_branch) == Token::If {
                self.print_if(else_branch);
            } else {
                self.print_block(else_branch);
            }
        }
    }

    fn print_for(&mut self, stmt: NodeId) {
        self.write("for (");
        let init = self.ast.first_child(stmt).expect("for init");
        match self.ast.token(init) {
            Token::Empty => {}
            Token::Var | Token::Let | Token::Const => self.print_declaration_list(init),
            _ => self.print_expr(init, prec::COMMA),
        }
        self.write("; ");
        let cond = self.ast.second_child(stmt).expect("for condition");
        if self.ast.token(cond) != Token::Empty {
            self.print_expr(cond, prec::COMMA);
        }
        self.write("; ");
        let incr = self.ast.third_child(stmt).expect("for increment");
        if self.ast.token(incr) != Token::Empty {
            self.print_expr(incr, prec::COMMA);
        }
        self.write(") ");
        let body = self.ast.next_sibling(incr).expect("for body");
        self.print_block(body);
    }

    fn print_for_each(&mut self, stmt: NodeId) {
        self.write("for (");
        let target = self.ast.first_child(stmt).expect("for-each target");
        match self.ast.token(target) {
            Token::Var | Token::Let | Token::Const => self.print_declaration_list(target),
            Token::ObjectPattern | Token::ArrayPattern => self.print_binding_target(target),
            _ => self.print_expr(target, prec::UNARY),
        }
        self.write(if self.ast.token(stmt) == Token::ForIn {
            " in "
        } else {
            " of "
        });
        let iterated = self.ast.second_child(stmt).expect("for-each expression");
        self.print_expr(iterated, prec::ASSIGN);
        self.write(") ");
        self.print_block(self.ast.third_child(stmt).expect("for-each body"));
    }

    fn print_switch(&mut self, stmt: NodeId) {
        self.write("switch (");
        let discriminant = self.ast.first_child(stmt).expect("switch discriminant");
        self.print_expr(discriminant, prec::COMMA);
        self.write(") {");
        self.newline();
        self.indent_level += 1;
        let mut case = self.ast.next_sibling(discriminant);
        while let Some(clause) = case {
            self.write_indent();
            let body = match self.ast.token(clause) {
                Token::Case => {
                    self.write("case ");
                    let test = self.ast.first_child(clause).expect("case test");
                    self.print_expr(test, prec::COMMA);
                    self.write(":");
                    self.ast.second_child(clause).expect("case body")
                }
                Token::DefaultCase => {
                    self.write("default:");
                    self.ast.first_child(clause).expect("default body")
                }
                other => panic!("bad switch clause: {:?}", other),
            };
            self.newline();
            self.indent_level += 1;
            for inner in self.ast.children(body) {
                self.write_indent();
                self.print_statement(inner);
                self.newline();
            }
            self.indent_level -= 1;
            case = self.ast.next_sibling(clause);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    fn print_try(&mut self, stmt: NodeId) {
        self.write("try ");
        self.print_block(self.ast.first_child(stmt).expect("try block"));
        let holder = self.ast.second_child(stmt).expect("catch holder");
        if let Some(catch) = self.ast.first_child(holder) {
            let binding = self.ast.first_child(catch).expect("catch binding");
            if self.ast.token(binding) == Token::Empty {
                self.write(" catch ");
            } else {
                self.write(" catch (");
                self.print_binding_target(binding);
                self.write(") ");
            }
            self.print_block(self.ast.second_child(catch).expect("catch body"));
        }
        if let Some(finally) = self.ast.third_child(stmt) {
            self.write(" finally ");
            self.print_block(finally);
        }
    }

    fn print_import(&mut self, stmt: NodeId) {
        self.write("import ");
        let default = self.ast.first_child(stmt).expect("import default");
        let specs = self.ast.second_child(stmt).expect("import specs");
        let module = self.ast.third_child(stmt).expect("import module");

        let has_default = self.ast.token(default) == Token::Name;
        let mut need_from = false;
        if has_default {
            self.write(self.ast.text(default).to_string().as_str());
            need_from = true;
        }
        match self.ast.token(specs) {
            Token::ImportStar => {
                if has_default {
                    self.write(", ");
                }
                self.write("* as ");
                self.write(self.ast.text(specs).to_string().as_str());
                need_from = true;
            }
            Token::ImportSpecs => {
                if has_default {
                    self.write(", ");
                }
                self.write("{");
                let mut first = true;
                for spec in self.ast.children(specs) {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    let external = self.ast.first_child(spec).expect("external name");
                    let local = self.ast.second_child(spec).expect("local name");
                    self.write(self.ast.text(external).to_string().as_str());
                    self.write(" as ");
                    self.write(self.ast.text(local).to_string().as_str());
                }
                self.write("}");
                need_from = true;
            }
            _ => {}
        }
        if need_from {
            self.write(" from ");
        }
        self.print_quoted(self.ast.text(module).to_string().as_str());
        self.write(";");
    }

    fn print_export(&mut self, stmt: NodeId) {
        self.write("export ");
        if self.ast.flags(stmt).contains(NodeFlags::EXPORT_DEFAULT) {
            self.write("default ");
        }
        let child = self.ast.first_child(stmt).expect("export target");
        match self.ast.token(child) {
            Token::ExportSpecs => {
                self.write("{");
                let mut first = true;
                for spec in self.ast.children(child) {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    let local = self.ast.first_child(spec).expect("local name");
                    let external = self.ast.second_child(spec).expect("external name");
                    self.write(self.ast.text(local).to_string().as_str());
                    self.write(" as ");
                    self.write(self.ast.text(external).to_string().as_str());
                }
                self.write("}");
                if let Some(module) = self.ast.next_sibling(child) {
                    self.write(" from ");
                    self.print_quoted(self.ast.text(module).to_string().as_str());
                }
                self.write(";");
            }
            Token::Var | Token::Let | Token::Const => {
                self.print_declaration_list(child);
                self.write(";");
            }
            Token::Function => self.print_function(child),
            Token::Class => self.print_class(child),
            _ => {
                self.print_expr(child, prec::ASSIGN);
                self.write(";");
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn print_expr(&mut self, expr: NodeId, parent_precedence: u8) {
        let own = expression_precedence(self.ast, expr);
        if own < parent_precedence {
            self.write("(");
            self.print_expr_inner(expr);
            self.write(")");
        } else {
            self.print_expr_inner(expr);
        }
    }

    fn print_expr_inner(&mut self, expr: NodeId) {
        let token = self.ast.token(expr);
        match token {
            Token::Name => self.write(self.ast.text(expr).to_string().as_str()),
            Token::Number => self.write(self.ast.text(expr).to_string().as_str()),
            Token::String => self.print_quoted(self.ast.text(expr).to_string().as_str()),
            Token::True => self.write("true"),
            Token::False => self.write("false"),
            Token::Null => self.write("null"),
            Token::This => self.write("this"),
            Token::Super => self.write("super"),
            Token::Empty => {}
            Token::Function => self.print_function(expr),
            Token::Class => self.print_class(expr),
            Token::Arrow => self.print_arrow(expr),
            Token::ObjectLit => self.print_object_literal(expr),
            Token::ArrayLit => self.print_array_literal(expr),
            Token::GetProp => {
                let object = self.ast.first_child(expr).expect("member object");
                self.print_callee(object, false);
                self.write(".");
                self.write(self.ast.text(expr).to_string().as_str());
            }
            Token::GetElem => {
                let object = self.ast.first_child(expr).expect("member object");
                self.print_callee(object, false);
                self.write("[");
                let index = self.ast.second_child(expr).expect("member index");
                self.print_expr(index, prec::COMMA);
                self.write("]");
            }
            Token::Call => {
                let callee = self.ast.first_child(expr).expect("callee");
                self.print_callee(callee, false);
                self.print_arguments(expr, callee);
            }
            Token::New => {
                self.write("new ");
                let callee = self.ast.first_child(expr).expect("new callee");
                self.print_callee(callee, true);
                self.print_arguments(expr, callee);
            }
            Token::Hook => {
                let cond = self.ast.first_child(expr).expect("condition");
                self.print_expr(cond, prec::HOOK + 1);
                self.write(" ? ");
                let consequent = self.ast.second_child(expr).expect("consequent");
                self.print_expr(consequent, prec::ASSIGN);
                self.write(" : ");
                let alternate = self.ast.third_child(expr).expect("alternate");
                self.print_expr(alternate, prec::ASSIGN);
            }
            Token::Spread => {
                self.write("...");
                let inner = self.ast.first_child(expr).expect("spread operand");
                self.print_expr(inner, prec::ASSIGN);
            }
            Token::Yield => {
                self.write("yield");
                if let Some(operand) = self.ast.first_child(expr) {
                    self.write(" ");
                    self.print_expr(operand, prec::ASSIGN);
                }
            }
            Token::Inc | Token::Dec => {
                let operand = self.ast.first_child(expr).expect("update operand");
                if self.ast.flags(expr).contains(NodeFlags::POSTFIX) {
                    self.print_expr(operand, prec::POSTFIX);
                    self.write(token.operator_str());
                } else {
                    self.write(token.operator_str());
                    self.print_expr(operand, prec::UNARY);
                }
            }
            _ if token.is_unary_op() => {
                self.write(token.operator_str());
                // Word operators need a space; `-` and `+` need one to avoid
                // fusing with a same-signed operand.
                let operand = self.ast.first_child(expr).expect("unary operand");
                let op = token.operator_str();
                if op.chars().next().map_or(false, |c| c.is_alphabetic()) {
                    self.write(" ");
                } else if matches!(token, Token::Neg | Token::Pos) {
                    let inner = self.ast.token(operand);
                    if matches!(inner, Token::Neg | Token::Pos | Token::Inc | Token::Dec) {
                        self.write(" ");
                    }
                }
                self.print_expr(operand, prec::UNARY);
            }
            _ if token.is_assign_op() => {
                let lhs = self.ast.first_child(expr).expect("assignment target");
                self.print_expr(lhs, prec::HOOK);
                self.write(" ");
                self.write(token.operator_str());
                self.write(" ");
                let rhs = self.ast.second_child(expr).expect("assignment value");
                self.print_expr(rhs, prec::ASSIGN);
            }
            _ if token.is_binary_op() => {
                let precedence = expression_precedence(self.ast, expr);
                let left = self.ast.first_child(expr).expect("binary left");
                let right = self.ast.second_child(expr).expect("binary right");
                // `**` is right-associative; everything else associates left.
                if token == Token::Exponent {
                    self.print_expr(left, precedence + 1);
                } else {
                    self.print_expr(left, precedence);
                }
                if token == Token::Comma {
                    self.write(", ");
                } else {
                    self.write(" ");
                    self.write(token.operator_str());
                    self.write(" ");
                }
                if token == Token::Exponent {
                    self.print_expr(right, precedence);
                } else {
                    self.print_expr(right, precedence + 1);
                }
            }
            other => panic!("cannot print expression token: {:?}", other),
        }
    }

    /// Print a callee or member-access base. Function, class, and object
    /// literals bind looser than the access syntax and need parens.
    fn print_callee(&mut self, callee: NodeId, in_new: bool) {
        let needs_parens = matches!(
            self.ast.token(callee),
            Token::Function | Token::Class | Token::Arrow | Token::ObjectLit
        ) || (in_new && contains_call(self.ast, callee))
            || expression_precedence(self.ast, callee) < prec::CALL;
        if needs_parens {
            self.write("(");
            self.print_expr_inner(callee);
            self.write(")");
        } else {
            self.print_expr_inner(callee);
        }
    }

    fn print_arguments(&mut self, call: NodeId, callee: NodeId) {
        self.write("(");
        let mut arg = self.ast.next_sibling(callee);
        let mut first = true;
        while let Some(a) = arg {
            if !first {
                self.write(", ");
            }
            first = false;
            self.print_expr(a, prec::ASSIGN);
            arg = self.ast.next_sibling(a);
        }
        self.write(")");
    }

    fn print_arrow(&mut self, arrow: NodeId) {
        if self.ast.flags(arrow).contains(NodeFlags::ASYNC) {
            self.write("async ");
        }
        let params = self.ast.first_child(arrow).expect("arrow params");
        self.print_param_list(params);
        self.write(" => ");
        let body = self.ast.second_child(arrow).expect("arrow body");
        if self.ast.token(body) == Token::Block {
            self.print_block(body);
        } else if starts_with_ambiguous_token(self.ast, body) {
            self.write("(");
            self.print_expr(body, prec::ASSIGN);
            self.write(")");
        } else {
            self.print_expr(body, prec::ASSIGN);
        }
    }

    fn print_object_literal(&mut self, object: NodeId) {
        if !self.ast.has_children(object) {
            self.write("{}");
            return;
        }
        self.write("{");
        let mut first = true;
        for member in self.ast.children(object) {
            if !first {
                self.write(", ");
            }
            first = false;
            match self.ast.token(member) {
                Token::StringKey => {
                    let key_text = self.ast.text(member).to_string();
                    let value = self.ast.first_child(member).expect("property value");
                    // Shorthand survives only while the reference still
                    // matches the key.
                    if self.ast.flags(member).contains(NodeFlags::SHORTHAND)
                        && self.ast.token(value) == Token::Name
                        && self.ast.text(value) == key_text
                    {
                        self.write(&key_text);
                        continue;
                    }
                    if self.ast.flags(member).contains(NodeFlags::QUOTED) {
                        self.print_quoted(&key_text);
                    } else {
                        self.write(&key_text);
                    }
                    self.write(": ");
                    self.print_expr(value, prec::ASSIGN);
                }
                Token::ComputedProp => {
                    self.write("[");
                    let key = self.ast.first_child(member).expect("computed key");
                    self.print_expr(key, prec::ASSIGN);
                    self.write("]: ");
                    let value = self.ast.second_child(member).expect("computed value");
                    self.print_expr(value, prec::ASSIGN);
                }
                Token::MemberFunctionDef => self.print_member_function(member),
                Token::Spread => {
                    self.write("...");
                    let inner = self.ast.first_child(member).expect("spread value");
                    self.print_expr(inner, prec::ASSIGN);
                }
                other => panic!("bad object literal member: {:?}", other),
            }
        }
        self.write("}");
    }

    fn print_array_literal(&mut self, array: NodeId) {
        self.write("[");
        let mut first = true;
        for element in self.ast.children(array) {
            if !first {
                self.write(", ");
            }
            first = false;
            if self.ast.token(element) != Token::Empty {
                self.print_expr(element, prec::ASSIGN);
            }
        }
        self.write("]");
    }

    fn print_quoted(&mut self, text: &str) {
        self.output.push('\'');
        for c in text.chars() {
            match c {
                '\'' => self.output.push_str("\\'"),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                '\r' => self.output.push_str("\\r"),
                '\0' => self.output.push_str("\\0"),
                _ => self.output.push(c),
            }
        }
        self.output.push('\'');
    }
}

/// Precedence of an expression node for paren re-derivation.
fn expression_precedence(ast: &Ast, expr: NodeId) -> u8 {
    let token = ast.token(expr);
    match token {
        Token::Comma => prec::COMMA,
        Token::Arrow | Token::Yield => prec::ASSIGN,
        Token::Hook => prec::HOOK,
        Token::Coalesce => 4,
        Token::Or => 5,
        Token::And => 6,
        Token::BitOr => 7,
        Token::BitXor => 8,
        Token::BitAnd => 9,
        Token::Eq | Token::Ne | Token::StrictEq | Token::StrictNe => 10,
        Token::Lt | Token::Gt | Token::Le | Token::Ge | Token::In | Token::InstanceOf => 11,
        Token::Lsh | Token::Rsh | Token::Ursh => 12,
        Token::Add | Token::Sub => 13,
        Token::Mul | Token::Div | Token::Mod => 14,
        Token::Exponent => 15,
        Token::Inc | Token::Dec => {
            if ast.flags(expr).contains(NodeFlags::POSTFIX) {
                prec::POSTFIX
            } else {
                prec::UNARY
            }
        }
        Token::Call | Token::New | Token::GetProp | Token::GetElem => prec::CALL,
        _ if token.is_assign_op() => prec::ASSIGN,
        _ if token.is_unary_op() => prec::UNARY,
        _ => prec::PRIMARY,
    }
}

/// Whether the leftmost token of this expression would be misparsed at the
/// start of an expression statement.
fn starts_with_ambiguous_token(ast: &Ast, expr: NodeId) -> bool {
    let mut cur = expr;
    loop {
        match ast.token(cur) {
            Token::Function | Token::Class | Token::ObjectLit => return true,
            Token::Call
            | Token::GetProp
            | Token::GetElem
            | Token::Comma
            | Token::Hook => match ast.first_child(cur) {
                Some(child) => cur = child,
                None => return false,
            },
            t if t.is_binary_op() || t.is_assign_op() => match ast.first_child(cur) {
                Some(child) => cur = child,
                None => return false,
            },
            Token::Inc | Token::Dec if ast.flags(cur).contains(NodeFlags::POSTFIX) => {
                match ast.first_child(cur) {
                    Some(child) => cur = child,
                    None => return false,
                }
            }
            _ => return false,
        }
    }
}

/// Whether a `new` callee subtree contains a call, which would bind the
/// argument list to the wrong expression without parens.
fn contains_call(ast: &Ast, expr: NodeId) -> bool {
    if ast.token(expr) == Token::Call {
        return true;
    }
    match ast.token(expr) {
        Token::GetProp | Token::GetElem => ast
            .first_child(expr)
            .map(|c| contains_call(ast, c))
            .unwrap_or(false),
        _ => false,
    }
}
