//! The parser implementation.

use crate::precedence::{assignment_operator, binary_operator, unary_operator};
use jsnorm_ast::{Ast, InputId, LanguageMode, NodeFlags, NodeId, Token};
use jsnorm_core::text::TextSpan;
use jsnorm_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use jsnorm_scanner::{Scanner, TokenKind};

/// The parser builds one `Script` subtree per source file into a shared
/// arena. Scripts that use import/export get their statements wrapped in a
/// `ModuleBody`.
pub struct Parser<'a> {
    ast: &'a mut Ast,
    scanner: Scanner,
    file_name: String,
    language: LanguageMode,
    diagnostics: DiagnosticCollection,
    /// Suppresses the `in` operator while a classic for-init is parsed.
    in_disallowed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(ast: &'a mut Ast, file_name: &str, source: &str, language: LanguageMode) -> Self {
        Self {
            ast,
            scanner: Scanner::new(source),
            file_name: file_name.to_string(),
            language,
            diagnostics: DiagnosticCollection::new(),
            in_disallowed: false,
        }
    }

    /// Parse the whole file into a `Script` node tagged with `input`.
    pub fn parse_script(mut self, input: InputId) -> (NodeId, DiagnosticCollection) {
        let script = self.ast.new_node(Token::Script, TextSpan::empty(0));
        self.ast.set_input(script, input);
        self.bump();

        let statements = self.parse_statement_list(TokenKind::EndOfFile);
        let is_module = statements
            .iter()
            .any(|&s| matches!(self.ast.token(s), Token::Import | Token::Export));

        if is_module {
            let body = self.ast.new_node(Token::ModuleBody, TextSpan::empty(0));
            for stmt in statements {
                self.ast.append_child(body, stmt);
            }
            self.ast.append_child(script, body);
        } else {
            for stmt in statements {
                self.ast.append_child(script, stmt);
            }
        }

        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.extend(self.scanner.take_diagnostics());
        (script, diagnostics)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn tok(&self) -> TokenKind {
        self.scanner.token()
    }

    #[inline]
    fn bump(&mut self) -> TokenKind {
        self.scanner.scan()
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.tok() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str) {
        if !self.eat(kind) {
            self.error(&messages::_0_EXPECTED, &[text]);
        }
    }

    fn span(&self) -> TextSpan {
        self.scanner.token_span()
    }

    fn token_text(&self) -> String {
        self.scanner.token_text().to_string()
    }

    /// Whether the current token is the contextual keyword `name`.
    fn is_ident(&self, name: &str) -> bool {
        self.at(TokenKind::Identifier) && self.scanner.token_text() == name
    }

    /// Look one token past the current one without committing.
    fn lookahead(&self) -> TokenKind {
        let mut clone = self.scanner.clone();
        clone.scan()
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            self.span(),
            message,
            args,
        ));
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement_list(&mut self, terminator: TokenKind) -> Vec<NodeId> {
        let mut statements = Vec::new();
        while !self.at(terminator) && !self.at(TokenKind::EndOfFile) {
            statements.push(self.parse_statement());
        }
        statements
    }

    fn parse_statement(&mut self) -> NodeId {
        match self.tok() {
            TokenKind::OpenBrace => self.parse_block(),
            TokenKind::VarKeyword | TokenKind::LetKeyword | TokenKind::ConstKeyword => {
                let list = self.parse_variable_declaration_list();
                self.parse_semicolon();
                list
            }
            TokenKind::FunctionKeyword => self.parse_function(false),
            TokenKind::ClassKeyword => self.parse_class(),
            TokenKind::IfKeyword => self.parse_if(),
            TokenKind::ForKeyword => self.parse_for(),
            TokenKind::WhileKeyword => self.parse_while(),
            TokenKind::DoKeyword => self.parse_do(),
            TokenKind::SwitchKeyword => self.parse_switch(),
            TokenKind::TryKeyword => self.parse_try(),
            TokenKind::ReturnKeyword => self.parse_return(),
            TokenKind::ThrowKeyword => {
                let span = self.span();
                self.bump();
                let node = self.ast.new_node(Token::Throw, span);
                let expr = self.parse_expression();
                self.ast.append_child(node, expr);
                self.parse_semicolon();
                node
            }
            TokenKind::BreakKeyword => {
                let node = self.ast.new_node(Token::Break, self.span());
                self.bump();
                self.parse_semicolon();
                node
            }
            TokenKind::ContinueKeyword => {
                let node = self.ast.new_node(Token::Continue, self.span());
                self.bump();
                self.parse_semicolon();
                node
            }
            TokenKind::Semicolon => {
                let node = self.ast.new_node(Token::Empty, self.span());
                self.bump();
                node
            }
            TokenKind::ImportKeyword => self.parse_import(),
            TokenKind::ExportKeyword => self.parse_export(),
            TokenKind::Identifier
                if self.scanner.token_text() == "async"
                    && self.lookahead() == TokenKind::FunctionKeyword =>
            {
                self.bump();
                self.parse_function(true)
            }
            _ => {
                let span = self.span();
                let expr = self.parse_expression();
                self.parse_semicolon();
                let node = self.ast.new_node(Token::ExprResult, span);
                self.ast.append_child(node, expr);
                node
            }
        }
    }

    fn parse_block(&mut self) -> NodeId {
        let block = self.ast.new_node(Token::Block, self.span());
        self.expect(TokenKind::OpenBrace, "{");
        let statements = self.parse_statement_list(TokenKind::CloseBrace);
        for stmt in statements {
            self.ast.append_child(block, stmt);
        }
        self.expect(TokenKind::CloseBrace, "}");
        block
    }

    /// Parse a control-structure body, normalizing single statements into a
    /// synthetic block.
    fn parse_statement_as_block(&mut self) -> NodeId {
        if self.at(TokenKind::OpenBrace) {
            return self.parse_block();
        }
        let block = self.ast.new_node(Token::Block, self.span());
        let stmt = self.parse_statement();
        self.ast.append_child(block, stmt);
        block
    }

    fn declaration_list_token(kind: TokenKind) -> Token {
        match kind {
            TokenKind::VarKeyword => Token::Var,
            TokenKind::LetKeyword => Token::Let,
            TokenKind::ConstKeyword => Token::Const,
            _ => unreachable!("not a declaration keyword"),
        }
    }

    fn parse_variable_declaration_list(&mut self) -> NodeId {
        let list = self
            .ast
            .new_node(Self::declaration_list_token(self.tok()), self.span());
        self.bump();
        loop {
            self.parse_variable_declarator(list);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        list
    }

    fn parse_variable_declarator(&mut self, list: NodeId) {
        match self.tok() {
            TokenKind::Identifier
            | TokenKind::AwaitKeyword
            | TokenKind::YieldKeyword => {
                let name = self
                    .ast
                    .new_string_node(Token::Name, self.scanner.token_text(), self.span());
                self.bump();
                if self.eat(TokenKind::Equals) {
                    let init = self.parse_assignment();
                    self.ast.append_child(name, init);
                }
                self.ast.append_child(list, name);
            }
            TokenKind::OpenBrace | TokenKind::OpenBracket => {
                let pattern = self.parse_binding_target();
                let lhs = self.ast.new_node(Token::DestructuringLhs, self.span());
                self.ast.append_child(lhs, pattern);
                if self.eat(TokenKind::Equals) {
                    let init = self.parse_assignment();
                    self.ast.append_child(lhs, init);
                }
                self.ast.append_child(list, lhs);
            }
            _ => {
                self.error(&messages::VARIABLE_DECLARATION_EXPECTED, &[]);
                self.bump();
            }
        }
    }

    // ========================================================================
    // Binding patterns
    // ========================================================================

    fn parse_binding_target(&mut self) -> NodeId {
        match self.tok() {
            TokenKind::Identifier => {
                let name = self
                    .ast
                    .new_string_node(Token::Name, self.scanner.token_text(), self.span());
                self.bump();
                name
            }
            TokenKind::OpenBrace => self.parse_object_binding_pattern(),
            TokenKind::OpenBracket => self.parse_array_binding_pattern(),
            _ => {
                self.error(&messages::IDENTIFIER_EXPECTED, &[]);
                let node = self.ast.new_node(Token::Empty, self.span());
                self.bump();
                node
            }
        }
    }

    /// A binding target with an optional default value.
    fn parse_binding_element(&mut self) -> NodeId {
        let target = self.parse_binding_target();
        if self.eat(TokenKind::Equals) {
            let default = self.ast.new_node(Token::DefaultValue, self.span());
            let init = self.parse_assignment();
            self.ast.append_child(default, target);
            self.ast.append_child(default, init);
            default
        } else {
            target
        }
    }

    fn parse_object_binding_pattern(&mut self) -> NodeId {
        let pattern = self.ast.new_node(Token::ObjectPattern, self.span());
        self.expect(TokenKind::OpenBrace, "{");
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
            if self.eat(TokenKind::DotDotDot) {
                let rest = self.ast.new_node(Token::Rest, self.span());
                let target = self.parse_binding_target();
                self.ast.append_child(rest, target);
                self.ast.append_child(pattern, rest);
            } else {
                let member = self.parse_object_pattern_member();
                self.ast.append_child(pattern, member);
            }
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseBrace, "}");
        pattern
    }

    fn parse_object_pattern_member(&mut self) -> NodeId {
        match self.tok() {
            TokenKind::OpenBracket => {
                self.bump();
                let computed = self.ast.new_node(Token::ComputedProp, self.span());
                let key = self.parse_assignment();
                self.expect(TokenKind::CloseBracket, "]");
                self.expect(TokenKind::Colon, ":");
                let target = self.parse_binding_element();
                self.ast.append_child(computed, key);
                self.ast.append_child(computed, target);
                computed
            }
            TokenKind::StringLiteral => {
                let key = self
                    .ast
                    .new_string_node(Token::StringKey, self.scanner.token_text(), self.span());
                self.ast.add_flags(key, NodeFlags::QUOTED);
                self.bump();
                self.expect(TokenKind::Colon, ":");
                let target = self.parse_binding_element();
                self.ast.append_child(key, target);
                key
            }
            _ => {
                let text = self.token_text();
                let span = self.span();
                if !self.at(TokenKind::Identifier) {
                    self.error(&messages::IDENTIFIER_EXPECTED, &[]);
                }
                let key = self.ast.new_string_node(Token::StringKey, &text, span);
                self.bump();
                if self.eat(TokenKind::Colon) {
                    let target = self.parse_binding_element();
                    self.ast.append_child(key, target);
                } else {
                    // Shorthand `{x}` or `{x = default}` expands to a key
                    // with a same-named binding.
                    self.ast.add_flags(key, NodeFlags::SHORTHAND);
                    let name = self.ast.new_string_node(Token::Name, &text, span);
                    if self.eat(TokenKind::Equals) {
                        let default = self.ast.new_node(Token::DefaultValue, self.span());
                        let init = self.parse_assignment();
                        self.ast.append_child(default, name);
                        self.ast.append_child(default, init);
                        self.ast.append_child(key, default);
                    } else {
                        self.ast.append_child(key, name);
                    }
                }
                key
            }
        }
    }

    fn parse_array_binding_pattern(&mut self) -> NodeId {
        let pattern = self.ast.new_node(Token::ArrayPattern, self.span());
        self.expect(TokenKind::OpenBracket, "[");
        while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::EndOfFile) {
            if self.at(TokenKind::Comma) {
                let hole = self.ast.new_node(Token::Empty, self.span());
                self.ast.append_child(pattern, hole);
                self.bump();
                continue;
            }
            let element = if self.eat(TokenKind::DotDotDot) {
                let rest = self.ast.new_node(Token::Rest, self.span());
                let target = self.parse_binding_target();
                self.ast.append_child(rest, target);
                rest
            } else {
                self.parse_binding_element()
            };
            self.ast.append_child(pattern, element);
            if !self.at(TokenKind::CloseBracket) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseBracket, "]");
        pattern
    }

    fn parse_param_list(&mut self) -> NodeId {
        let params = self.ast.new_node(Token::ParamList, self.span());
        self.expect(TokenKind::OpenParen, "(");
        while !self.at(TokenKind::CloseParen) && !self.at(TokenKind::EndOfFile) {
            if self.eat(TokenKind::DotDotDot) {
                let rest = self.ast.new_node(Token::Rest, self.span());
                let target = self.parse_binding_target();
                self.ast.append_child(rest, target);
                self.ast.append_child(params, rest);
                if !self.at(TokenKind::CloseParen) {
                    self.error(&messages::A_REST_PARAMETER_MUST_BE_LAST, &[]);
                }
            } else {
                let param = self.parse_binding_element();
                self.ast.append_child(params, param);
            }
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseParen, ")");
        params
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    fn parse_function(&mut self, is_async: bool) -> NodeId {
        let span = self.span();
        if is_async && !self.language.supports_async() {
            let mode = self.language.to_string();
            self.error(&messages::_0_IS_NOT_AVAILABLE_IN_LANGUAGE_MODE_1, &["async", &mode]);
        }
        self.expect(TokenKind::FunctionKeyword, "function");
        let is_generator = self.eat(TokenKind::Asterisk);

        let name = if self.at(TokenKind::Identifier) {
            let name = self
                .ast
                .new_string_node(Token::Name, self.scanner.token_text(), self.span());
            self.bump();
            name
        } else {
            self.ast.new_string_node(Token::Name, "", span)
        };

        let function = self.ast.new_node(Token::Function, span);
        if is_async {
            self.ast.add_flags(function, NodeFlags::ASYNC);
        }
        if is_generator {
            self.ast.add_flags(function, NodeFlags::GENERATOR);
        }
        let params = self.parse_param_list();
        let body = self.parse_block();
        self.ast.append_child(function, name);
        self.ast.append_child(function, params);
        self.ast.append_child(function, body);
        function
    }

    fn parse_class(&mut self) -> NodeId {
        let span = self.span();
        self.expect(TokenKind::ClassKeyword, "class");

        let name = if self.at(TokenKind::Identifier) {
            let name = self
                .ast
                .new_string_node(Token::Name, self.scanner.token_text(), self.span());
            self.bump();
            name
        } else {
            self.ast.new_string_node(Token::Name, "", span)
        };

        let heritage = if self.eat(TokenKind::ExtendsKeyword) {
            self.parse_call_expression()
        } else {
            self.ast.new_node(Token::Empty, span)
        };

        let members = self.ast.new_node(Token::ClassMembers, self.span());
        self.expect(TokenKind::OpenBrace, "{");
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let member = self.parse_class_member();
            self.ast.append_child(members, member);
        }
        self.expect(TokenKind::CloseBrace, "}");

        let class = self.ast.new_node(Token::Class, span);
        self.ast.append_child(class, name);
        self.ast.append_child(class, heritage);
        self.ast.append_child(class, members);
        class
    }

    fn parse_class_member(&mut self) -> NodeId {
        let span = self.span();
        let mut is_static = false;
        let mut is_async = false;

        if self.is_ident("static") && self.lookahead() != TokenKind::OpenParen {
            is_static = true;
            self.bump();
        }
        if self.is_ident("async") && self.lookahead() != TokenKind::OpenParen {
            is_async = true;
            self.bump();
        }
        let is_generator = self.eat(TokenKind::Asterisk);

        let name_text = self.token_text();
        if !self.at(TokenKind::Identifier) && !self.at(TokenKind::StringLiteral) {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
        }
        self.bump();

        let function = self.ast.new_node(Token::Function, span);
        if is_async {
            self.ast.add_flags(function, NodeFlags::ASYNC);
        }
        if is_generator {
            self.ast.add_flags(function, NodeFlags::GENERATOR);
        }
        let fn_name = self.ast.new_string_node(Token::Name, "", span);
        let params = self.parse_param_list();
        let body = self.parse_block();
        self.ast.append_child(function, fn_name);
        self.ast.append_child(function, params);
        self.ast.append_child(function, body);

        let member = self
            .ast
            .new_string_node(Token::MemberFunctionDef, &name_text, span);
        if is_static {
            self.ast.add_flags(member, NodeFlags::STATIC);
        }
        self.ast.append_child(member, function);
        member
    }

    // ========================================================================
    // Control structures
    // ========================================================================

    fn parse_if(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::If, self.span());
        self.expect(TokenKind::IfKeyword, "if");
        self.expect(TokenKind::OpenParen, "(");
        let cond = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        let then_branch = self.parse_statement_as_block();
        self.ast.append_child(node, cond);
        self.ast.append_child(node, then_branch);
        if self.eat(TokenKind::ElseKeyword) {
            let else_branch = if self.at(TokenKind::IfKeyword) {
                self.parse_if()
            } else {
                self.parse_statement_as_block()
            };
            self.ast.append_child(node, else_branch);
        }
        node
    }

    fn parse_while(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::While, self.span());
        self.expect(TokenKind::WhileKeyword, "while");
        self.expect(TokenKind::OpenParen, "(");
        let cond = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        let body = self.parse_statement_as_block();
        self.ast.append_child(node, cond);
        self.ast.append_child(node, body);
        node
    }

    fn parse_do(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Do, self.span());
        self.expect(TokenKind::DoKeyword, "do");
        let body = self.parse_statement_as_block();
        self.expect(TokenKind::WhileKeyword, "while");
        self.expect(TokenKind::OpenParen, "(");
        let cond = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        self.parse_semicolon();
        self.ast.append_child(node, body);
        self.ast.append_child(node, cond);
        node
    }

    fn parse_for(&mut self) -> NodeId {
        let span = self.span();
        self.expect(TokenKind::ForKeyword, "for");
        self.expect(TokenKind::OpenParen, "(");

        // Empty init.
        if self.at(TokenKind::Semicolon) {
            let init = self.ast.new_node(Token::Empty, self.span());
            return self.parse_classic_for_tail(span, init);
        }

        // Declaration init.
        if matches!(
            self.tok(),
            TokenKind::VarKeyword | TokenKind::LetKeyword | TokenKind::ConstKeyword
        ) {
            let list = self
                .ast
                .new_node(Self::declaration_list_token(self.tok()), self.span());
            self.bump();
            let target = self.parse_binding_target();

            if self.at(TokenKind::InKeyword) {
                self.ast.append_child(list, target);
                self.bump();
                return self.parse_for_each_tail(span, Token::ForIn, list);
            }
            if self.is_ident("of") {
                self.ast.append_child(list, target);
                self.bump();
                return self.parse_for_each_tail(span, Token::ForOf, list);
            }

            // Classic for with declarations: re-attach the first target with
            // its optional initializer, then the rest of the list.
            let declarator = if self.ast.token(target) == Token::Name {
                if self.eat(TokenKind::Equals) {
                    let saved = std::mem::replace(&mut self.in_disallowed, true);
                    let init = self.parse_assignment();
                    self.in_disallowed = saved;
                    self.ast.append_child(target, init);
                }
                target
            } else {
                let lhs = self.ast.new_node(Token::DestructuringLhs, self.span());
                self.ast.append_child(lhs, target);
                if self.eat(TokenKind::Equals) {
                    let saved = std::mem::replace(&mut self.in_disallowed, true);
                    let init = self.parse_assignment();
                    self.in_disallowed = saved;
                    self.ast.append_child(lhs, init);
                }
                lhs
            };
            self.ast.append_child(list, declarator);
            while self.eat(TokenKind::Comma) {
                let saved = std::mem::replace(&mut self.in_disallowed, true);
                self.parse_variable_declarator(list);
                self.in_disallowed = saved;
            }
            return self.parse_classic_for_tail(span, list);
        }

        // Expression init.
        let saved = std::mem::replace(&mut self.in_disallowed, true);
        let init = self.parse_expression();
        self.in_disallowed = saved;

        if self.at(TokenKind::InKeyword) {
            self.bump();
            return self.parse_for_each_tail(span, Token::ForIn, init);
        }
        if self.is_ident("of") {
            self.bump();
            return self.parse_for_each_tail(span, Token::ForOf, init);
        }
        self.parse_classic_for_tail(span, init)
    }

    fn parse_classic_for_tail(&mut self, span: TextSpan, init: NodeId) -> NodeId {
        self.expect(TokenKind::Semicolon, ";");
        let cond = if self.at(TokenKind::Semicolon) {
            self.ast.new_node(Token::Empty, self.span())
        } else {
            self.parse_expression()
        };
        self.expect(TokenKind::Semicolon, ";");
        let incr = if self.at(TokenKind::CloseParen) {
            self.ast.new_node(Token::Empty, self.span())
        } else {
            self.parse_expression()
        };
        self.expect(TokenKind::CloseParen, ")");
        let body = self.parse_statement_as_block();

        let node = self.ast.new_node(Token::For, span);
        self.ast.append_child(node, init);
        self.ast.append_child(node, cond);
        self.ast.append_child(node, incr);
        self.ast.append_child(node, body);
        node
    }

    fn parse_for_each_tail(&mut self, span: TextSpan, token: Token, target: NodeId) -> NodeId {
        let iterated = self.parse_assignment();
        self.expect(TokenKind::CloseParen, ")");
        let body = self.parse_statement_as_block();

        let node = self.ast.new_node(token, span);
        self.ast.append_child(node, target);
        self.ast.append_child(node, iterated);
        self.ast.append_child(node, body);
        node
    }

    fn parse_switch(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Switch, self.span());
        self.expect(TokenKind::SwitchKeyword, "switch");
        self.expect(TokenKind::OpenParen, "(");
        let discriminant = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        self.ast.append_child(node, discriminant);

        self.expect(TokenKind::OpenBrace, "{");
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
            match self.tok() {
                TokenKind::CaseKeyword => {
                    let case = self.ast.new_node(Token::Case, self.span());
                    self.bump();
                    let test = self.parse_expression();
                    self.expect(TokenKind::Colon, ":");
                    let body = self.parse_case_body();
                    self.ast.append_child(case, test);
                    self.ast.append_child(case, body);
                    self.ast.append_child(node, case);
                }
                TokenKind::DefaultKeyword => {
                    let case = self.ast.new_node(Token::DefaultCase, self.span());
                    self.bump();
                    self.expect(TokenKind::Colon, ":");
                    let body = self.parse_case_body();
                    self.ast.append_child(case, body);
                    self.ast.append_child(node, case);
                }
                _ => {
                    self.error(&messages::CASE_OR_DEFAULT_EXPECTED, &[]);
                    self.bump();
                }
            }
        }
        self.expect(TokenKind::CloseBrace, "}");
        node
    }

    /// Statements of one case clause, in a synthetic block.
    fn parse_case_body(&mut self) -> NodeId {
        let block = self.ast.new_node(Token::Block, self.span());
        while !matches!(
            self.tok(),
            TokenKind::CaseKeyword
                | TokenKind::DefaultKeyword
                | TokenKind::CloseBrace
                | TokenKind::EndOfFile
        ) {
            let stmt = self.parse_statement();
            self.ast.append_child(block, stmt);
        }
        block
    }

    fn parse_try(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Try, self.span());
        self.expect(TokenKind::TryKeyword, "try");
        let try_block = self.parse_block();
        self.ast.append_child(node, try_block);

        // The catch clause sits inside a holder block; that block is the
        // catch scope's root.
        let holder = self.ast.new_node(Token::Block, self.span());
        let mut has_catch = false;
        if self.at(TokenKind::CatchKeyword) {
            has_catch = true;
            let catch = self.ast.new_node(Token::Catch, self.span());
            self.bump();
            let binding = if self.eat(TokenKind::OpenParen) {
                let binding = self.parse_binding_target();
                self.expect(TokenKind::CloseParen, ")");
                binding
            } else {
                self.ast.new_node(Token::Empty, self.span())
            };
            let body = self.parse_block();
            self.ast.append_child(catch, binding);
            self.ast.append_child(catch, body);
            self.ast.append_child(holder, catch);
        }
        self.ast.append_child(node, holder);

        if self.eat(TokenKind::FinallyKeyword) {
            let finally = self.parse_block();
            self.ast.append_child(node, finally);
        } else if !has_catch {
            self.error(&messages::CATCH_OR_FINALLY_EXPECTED, &[]);
        }
        node
    }

    fn parse_return(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Return, self.span());
        self.bump();
        let ends = matches!(
            self.tok(),
            TokenKind::Semicolon | TokenKind::CloseBrace | TokenKind::EndOfFile
        );
        if !ends && !self.scanner.has_preceding_line_break() {
            let expr = self.parse_expression();
            self.ast.append_child(node, expr);
        }
        self.parse_semicolon();
        node
    }

    // ========================================================================
    // Modules
    // ========================================================================

    /// A module export name: an identifier or any reserved word.
    fn parse_module_name(&mut self) -> NodeId {
        let text = self.token_text();
        if text.is_empty() {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
        }
        let name = self.ast.new_string_node(Token::Name, &text, self.span());
        self.bump();
        name
    }

    fn parse_import(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Import, self.span());
        self.expect(TokenKind::ImportKeyword, "import");

        // Bare import: `import 'module';`
        if self.at(TokenKind::StringLiteral) {
            let e1 = self.ast.new_node(Token::Empty, self.span());
            let e2 = self.ast.new_node(Token::Empty, self.span());
            let module = self
                .ast
                .new_string_node(Token::String, self.scanner.token_text(), self.span());
            self.bump();
            self.ast.append_child(node, e1);
            self.ast.append_child(node, e2);
            self.ast.append_child(node, module);
            self.parse_semicolon();
            return node;
        }

        let default = if self.at(TokenKind::Identifier) && !self.is_ident("from") {
            let name = self
                .ast
                .new_string_node(Token::Name, self.scanner.token_text(), self.span());
            self.bump();
            self.eat(TokenKind::Comma);
            name
        } else {
            self.ast.new_node(Token::Empty, self.span())
        };

        let specs = if self.at(TokenKind::Asterisk) {
            self.bump();
            if !self.is_ident("as") {
                self.error(&messages::_0_EXPECTED, &["as"]);
            } else {
                self.bump();
            }
            let local = self.token_text();
            if !self.at(TokenKind::Identifier) {
                self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            }
            let star = self
                .ast
                .new_string_node(Token::ImportStar, &local, self.span());
            self.bump();
            star
        } else if self.at(TokenKind::OpenBrace) {
            let specs = self.ast.new_node(Token::ImportSpecs, self.span());
            self.bump();
            while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
                let spec = self.ast.new_node(Token::ImportSpec, self.span());
                let external = self.parse_module_name();
                let local = if self.is_ident("as") {
                    self.bump();
                    self.parse_module_name()
                } else {
                    let text = self.ast.text(external).to_string();
                    self.ast
                        .new_string_node(Token::Name, &text, self.ast.node_span(external))
                };
                self.ast.append_child(spec, external);
                self.ast.append_child(spec, local);
                self.ast.append_child(specs, spec);
                if !self.at(TokenKind::CloseBrace) {
                    self.expect(TokenKind::Comma, ",");
                }
            }
            self.expect(TokenKind::CloseBrace, "}");
            specs
        } else {
            self.ast.new_node(Token::Empty, self.span())
        };

        if !self.is_ident("from") {
            self.error(&messages::_0_EXPECTED, &["from"]);
        } else {
            self.bump();
        }
        let module = if self.at(TokenKind::StringLiteral) {
            let module = self
                .ast
                .new_string_node(Token::String, self.scanner.token_text(), self.span());
            self.bump();
            module
        } else {
            self.error(&messages::STRING_LITERAL_EXPECTED, &[]);
            self.ast.new_string_node(Token::String, "", self.span())
        };

        self.ast.append_child(node, default);
        self.ast.append_child(node, specs);
        self.ast.append_child(node, module);
        self.parse_semicolon();
        node
    }

    fn parse_export(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Export, self.span());
        self.expect(TokenKind::ExportKeyword, "export");

        match self.tok() {
            TokenKind::OpenBrace => {
                let specs = self.ast.new_node(Token::ExportSpecs, self.span());
                self.bump();
                while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
                    let spec = self.ast.new_node(Token::ExportSpec, self.span());
                    let local = self.parse_module_name();
                    let external = if self.is_ident("as") {
                        self.bump();
                        self.parse_module_name()
                    } else {
                        let text = self.ast.text(local).to_string();
                        self.ast
                            .new_string_node(Token::Name, &text, self.ast.node_span(local))
                    };
                    self.ast.append_child(spec, local);
                    self.ast.append_child(spec, external);
                    self.ast.append_child(specs, spec);
                    if !self.at(TokenKind::CloseBrace) {
                        self.expect(TokenKind::Comma, ",");
                    }
                }
                self.expect(TokenKind::CloseBrace, "}");
                self.ast.append_child(node, specs);
                if self.is_ident("from") {
                    self.bump();
                    if self.at(TokenKind::StringLiteral) {
                        let module = self.ast.new_string_node(
                            Token::String,
                            self.scanner.token_text(),
                            self.span(),
                        );
                        self.bump();
                        self.ast.append_child(node, module);
                    } else {
                        self.error(&messages::STRING_LITERAL_EXPECTED, &[]);
                    }
                }
                self.parse_semicolon();
            }
            TokenKind::VarKeyword | TokenKind::LetKeyword | TokenKind::ConstKeyword => {
                let list = self.parse_variable_declaration_list();
                self.parse_semicolon();
                self.ast.append_child(node, list);
            }
            TokenKind::FunctionKeyword => {
                let function = self.parse_function(false);
                self.ast.append_child(node, function);
            }
            TokenKind::ClassKeyword => {
                let class = self.parse_class();
                self.ast.append_child(node, class);
            }
            TokenKind::DefaultKeyword => {
                self.bump();
                self.ast.add_flags(node, NodeFlags::EXPORT_DEFAULT);
                let child = match self.tok() {
                    TokenKind::FunctionKeyword => self.parse_function(false),
                    TokenKind::ClassKeyword => self.parse_class(),
                    TokenKind::Identifier
                        if self.scanner.token_text() == "async"
                            && self.lookahead() == TokenKind::FunctionKeyword =>
                    {
                        self.bump();
                        self.parse_function(true)
                    }
                    _ => {
                        let expr = self.parse_assignment();
                        self.parse_semicolon();
                        expr
                    }
                };
                self.ast.append_child(node, child);
            }
            TokenKind::Identifier
                if self.scanner.token_text() == "async"
                    && self.lookahead() == TokenKind::FunctionKeyword =>
            {
                self.bump();
                let function = self.parse_function(true);
                self.ast.append_child(node, function);
            }
            _ => {
                self.error(&messages::STATEMENT_EXPECTED, &[]);
                self.bump();
            }
        }
        node
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> NodeId {
        let mut left = self.parse_assignment();
        while self.at(TokenKind::Comma) {
            let node = self.ast.new_node(Token::Comma, self.span());
            self.bump();
            let right = self.parse_assignment();
            self.ast.append_child(node, left);
            self.ast.append_child(node, right);
            left = node;
        }
        left
    }

    /// Whether the token stream at an `(` is an arrow-function head.
    fn paren_starts_arrow(&self) -> bool {
        let mut clone = self.scanner.clone();
        debug_assert_eq!(clone.token(), TokenKind::OpenParen);
        let mut depth = 1u32;
        loop {
            match clone.scan() {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return clone.scan() == TokenKind::EqualsGreaterThan;
                    }
                }
                TokenKind::EndOfFile => return false,
                _ => {}
            }
        }
    }

    fn parse_assignment(&mut self) -> NodeId {
        // Arrow heads.
        if self.at(TokenKind::Identifier) && !self.is_ident("async") {
            if self.lookahead() == TokenKind::EqualsGreaterThan {
                return self.parse_arrow_with_single_param(false);
            }
        }
        if self.is_ident("async") && self.language.supports_async() {
            let mut clone = self.scanner.clone();
            match clone.scan() {
                TokenKind::FunctionKeyword => {
                    self.bump();
                    return self.parse_function(true);
                }
                TokenKind::Identifier => {
                    if clone.scan() == TokenKind::EqualsGreaterThan {
                        self.bump();
                        return self.parse_arrow_with_single_param(true);
                    }
                }
                TokenKind::OpenParen => {
                    // Re-check from the `(` with the async keyword consumed.
                    let saved = self.scanner.clone();
                    self.bump();
                    if self.paren_starts_arrow() {
                        return self.parse_arrow(true);
                    }
                    self.scanner = saved;
                }
                _ => {}
            }
        }
        if self.at(TokenKind::OpenParen) && self.paren_starts_arrow() {
            return self.parse_arrow(false);
        }
        if self.at(TokenKind::YieldKeyword) {
            return self.parse_yield();
        }

        let lhs = self.parse_conditional();
        if let Some(op) = assignment_operator(self.tok()) {
            if !matches!(
                self.ast.token(lhs),
                Token::Name
                    | Token::GetProp
                    | Token::GetElem
                    | Token::ObjectLit
                    | Token::ArrayLit
            ) {
                self.error(&messages::INVALID_ASSIGNMENT_TARGET, &[]);
            }
            let node = self.ast.new_node(op, self.span());
            self.bump();
            let rhs = self.parse_assignment();
            self.ast.append_child(node, lhs);
            self.ast.append_child(node, rhs);
            return node;
        }
        lhs
    }

    fn parse_conditional(&mut self) -> NodeId {
        let cond = self.parse_binary(0);
        if self.at(TokenKind::Question) {
            let node = self.ast.new_node(Token::Hook, self.span());
            self.bump();
            let consequent = self.parse_assignment();
            self.expect(TokenKind::Colon, ":");
            let alternate = self.parse_assignment();
            self.ast.append_child(node, cond);
            self.ast.append_child(node, consequent);
            self.ast.append_child(node, alternate);
            return node;
        }
        cond
    }

    fn parse_binary(&mut self, min_precedence: u8) -> NodeId {
        let mut left = self.parse_unary();
        loop {
            let Some((op, precedence)) = binary_operator(self.tok()) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            if self.in_disallowed && op == Token::In {
                break;
            }
            if op == Token::Exponent && !self.language.supports_exponent() {
                let mode = self.language.to_string();
                self.error(&messages::_0_IS_NOT_AVAILABLE_IN_LANGUAGE_MODE_1, &["**", &mode]);
            }
            let node = self.ast.new_node(op, self.span());
            self.bump();
            // `**` is right-associative.
            let next_min = if op == Token::Exponent {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min);
            self.ast.append_child(node, left);
            self.ast.append_child(node, right);
            left = node;
        }
        left
    }

    fn parse_unary(&mut self) -> NodeId {
        if let Some(op) = unary_operator(self.tok()) {
            let node = self.ast.new_node(op, self.span());
            self.bump();
            let operand = self.parse_unary();
            self.ast.append_child(node, operand);
            return node;
        }
        match self.tok() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.at(TokenKind::PlusPlus) {
                    Token::Inc
                } else {
                    Token::Dec
                };
                let node = self.ast.new_node(op, self.span());
                self.bump();
                let operand = self.parse_unary();
                self.ast.append_child(node, operand);
                node
            }
            TokenKind::AwaitKeyword => {
                let node = self.ast.new_node(Token::Await, self.span());
                self.bump();
                let operand = self.parse_unary();
                self.ast.append_child(node, operand);
                node
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> NodeId {
        let expr = self.parse_call_expression();
        if matches!(self.tok(), TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.scanner.has_preceding_line_break()
        {
            let op = if self.at(TokenKind::PlusPlus) {
                Token::Inc
            } else {
                Token::Dec
            };
            let node = self.ast.new_node(op, self.span());
            self.ast.add_flags(node, NodeFlags::POSTFIX);
            self.bump();
            self.ast.append_child(node, expr);
            return node;
        }
        expr
    }

    fn parse_call_expression(&mut self) -> NodeId {
        let base = if self.at(TokenKind::NewKeyword) {
            self.parse_new()
        } else {
            self.parse_primary()
        };
        self.parse_call_tail(base, true)
    }

    fn parse_call_tail(&mut self, mut base: NodeId, allow_call: bool) -> NodeId {
        loop {
            match self.tok() {
                TokenKind::Dot => {
                    self.bump();
                    let prop = self.token_text();
                    if prop.is_empty() {
                        self.error(&messages::IDENTIFIER_EXPECTED, &[]);
                    }
                    let node = self
                        .ast
                        .new_string_node(Token::GetProp, &prop, self.span());
                    self.bump();
                    self.ast.append_child(node, base);
                    base = node;
                }
                TokenKind::OpenBracket => {
                    let node = self.ast.new_node(Token::GetElem, self.span());
                    self.bump();
                    let index = self.parse_expression();
                    self.expect(TokenKind::CloseBracket, "]");
                    self.ast.append_child(node, base);
                    self.ast.append_child(node, index);
                    base = node;
                }
                TokenKind::OpenParen if allow_call => {
                    let node = self.ast.new_node(Token::Call, self.span());
                    self.ast.append_child(node, base);
                    self.parse_arguments(node);
                    base = node;
                }
                _ => break,
            }
        }
        base
    }

    fn parse_arguments(&mut self, call: NodeId) {
        self.expect(TokenKind::OpenParen, "(");
        while !self.at(TokenKind::CloseParen) && !self.at(TokenKind::EndOfFile) {
            let arg = if self.eat(TokenKind::DotDotDot) {
                let spread = self.ast.new_node(Token::Spread, self.span());
                let expr = self.parse_assignment();
                self.ast.append_child(spread, expr);
                spread
            } else {
                self.parse_assignment()
            };
            self.ast.append_child(call, arg);
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseParen, ")");
    }

    fn parse_new(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::New, self.span());
        self.expect(TokenKind::NewKeyword, "new");
        let callee = if self.at(TokenKind::NewKeyword) {
            self.parse_new()
        } else {
            let base = self.parse_primary();
            self.parse_call_tail(base, false)
        };
        self.ast.append_child(node, callee);
        if self.at(TokenKind::OpenParen) {
            self.parse_arguments(node);
        }
        node
    }

    fn parse_primary(&mut self) -> NodeId {
        match self.tok() {
            TokenKind::Identifier => {
                let name = self
                    .ast
                    .new_string_node(Token::Name, self.scanner.token_text(), self.span());
                self.bump();
                name
            }
            TokenKind::NumericLiteral => {
                let node = self
                    .ast
                    .new_string_node(Token::Number, self.scanner.token_text(), self.span());
                self.bump();
                node
            }
            TokenKind::StringLiteral => {
                let node = self
                    .ast
                    .new_string_node(Token::String, self.scanner.token_text(), self.span());
                self.bump();
                node
            }
            TokenKind::TrueKeyword => self.simple_primary(Token::True),
            TokenKind::FalseKeyword => self.simple_primary(Token::False),
            TokenKind::NullKeyword => self.simple_primary(Token::Null),
            TokenKind::ThisKeyword => self.simple_primary(Token::This),
            TokenKind::SuperKeyword => self.simple_primary(Token::Super),
            TokenKind::OpenParen => {
                self.bump();
                let saved = std::mem::replace(&mut self.in_disallowed, false);
                let expr = self.parse_expression();
                self.in_disallowed = saved;
                self.expect(TokenKind::CloseParen, ")");
                expr
            }
            TokenKind::OpenBracket => self.parse_array_literal(),
            TokenKind::OpenBrace => self.parse_object_literal(),
            TokenKind::FunctionKeyword => self.parse_function(false),
            TokenKind::ClassKeyword => self.parse_class(),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                let node = self.ast.new_node(Token::Empty, self.span());
                self.bump();
                node
            }
        }
    }

    fn simple_primary(&mut self, token: Token) -> NodeId {
        let node = self.ast.new_node(token, self.span());
        self.bump();
        node
    }

    fn parse_array_literal(&mut self) -> NodeId {
        let array = self.ast.new_node(Token::ArrayLit, self.span());
        self.expect(TokenKind::OpenBracket, "[");
        while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::EndOfFile) {
            if self.at(TokenKind::Comma) {
                let hole = self.ast.new_node(Token::Empty, self.span());
                self.ast.append_child(array, hole);
                self.bump();
                continue;
            }
            let element = if self.eat(TokenKind::DotDotDot) {
                let spread = self.ast.new_node(Token::Spread, self.span());
                let expr = self.parse_assignment();
                self.ast.append_child(spread, expr);
                spread
            } else {
                self.parse_assignment()
            };
            self.ast.append_child(array, element);
            if !self.at(TokenKind::CloseBracket) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseBracket, "]");
        array
    }

    fn parse_object_literal(&mut self) -> NodeId {
        let object = self.ast.new_node(Token::ObjectLit, self.span());
        self.expect(TokenKind::OpenBrace, "{");
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::EndOfFile) {
            let member = self.parse_object_literal_member();
            self.ast.append_child(object, member);
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        self.expect(TokenKind::CloseBrace, "}");
        object
    }

    fn parse_object_literal_member(&mut self) -> NodeId {
        match self.tok() {
            TokenKind::DotDotDot => {
                let spread = self.ast.new_node(Token::Spread, self.span());
                self.bump();
                let expr = self.parse_assignment();
                self.ast.append_child(spread, expr);
                spread
            }
            TokenKind::OpenBracket => {
                self.bump();
                let computed = self.ast.new_node(Token::ComputedProp, self.span());
                let key = self.parse_assignment();
                self.expect(TokenKind::CloseBracket, "]");
                self.expect(TokenKind::Colon, ":");
                let value = self.parse_assignment();
                self.ast.append_child(computed, key);
                self.ast.append_child(computed, value);
                computed
            }
            TokenKind::StringLiteral | TokenKind::NumericLiteral => {
                let quoted = self.at(TokenKind::StringLiteral);
                let key = self
                    .ast
                    .new_string_node(Token::StringKey, self.scanner.token_text(), self.span());
                if quoted {
                    self.ast.add_flags(key, NodeFlags::QUOTED);
                }
                self.bump();
                self.expect(TokenKind::Colon, ":");
                let value = self.parse_assignment();
                self.ast.append_child(key, value);
                key
            }
            _ => {
                let text = self.token_text();
                let span = self.span();
                if text.is_empty() {
                    self.error(&messages::PROPERTY_ASSIGNMENT_EXPECTED, &[]);
                    let node = self.ast.new_node(Token::Empty, span);
                    self.bump();
                    return node;
                }
                match self.lookahead() {
                    TokenKind::OpenParen => {
                        // Method shorthand.
                        self.bump();
                        let function = self.ast.new_node(Token::Function, span);
                        let fn_name = self.ast.new_string_node(Token::Name, "", span);
                        let params = self.parse_param_list();
                        let body = self.parse_block();
                        self.ast.append_child(function, fn_name);
                        self.ast.append_child(function, params);
                        self.ast.append_child(function, body);
                        let member = self
                            .ast
                            .new_string_node(Token::MemberFunctionDef, &text, span);
                        self.ast.append_child(member, function);
                        member
                    }
                    TokenKind::Colon => {
                        let key = self.ast.new_string_node(Token::StringKey, &text, span);
                        self.bump();
                        self.bump();
                        let value = self.parse_assignment();
                        self.ast.append_child(key, value);
                        key
                    }
                    _ => {
                        // Shorthand `{x}`: the value half is a reference.
                        let key = self.ast.new_string_node(Token::StringKey, &text, span);
                        self.ast.add_flags(key, NodeFlags::SHORTHAND);
                        self.bump();
                        let value = self.ast.new_string_node(Token::Name, &text, span);
                        self.ast.append_child(key, value);
                        key
                    }
                }
            }
        }
    }

    fn parse_arrow_with_single_param(&mut self, is_async: bool) -> NodeId {
        let span = self.span();
        let params = self.ast.new_node(Token::ParamList, span);
        let param = self
            .ast
            .new_string_node(Token::Name, self.scanner.token_text(), span);
        self.bump();
        self.ast.append_child(params, param);
        self.parse_arrow_tail(span, params, is_async)
    }

    fn parse_arrow(&mut self, is_async: bool) -> NodeId {
        let span = self.span();
        let params = self.parse_param_list();
        self.parse_arrow_tail(span, params, is_async)
    }

    fn parse_arrow_tail(&mut self, span: TextSpan, params: NodeId, is_async: bool) -> NodeId {
        self.expect(TokenKind::EqualsGreaterThan, "=>");
        let body = if self.at(TokenKind::OpenBrace) {
            self.parse_block()
        } else {
            self.parse_assignment()
        };
        let arrow = self.ast.new_node(Token::Arrow, span);
        if is_async {
            self.ast.add_flags(arrow, NodeFlags::ASYNC);
        }
        self.ast.append_child(arrow, params);
        self.ast.append_child(arrow, body);
        arrow
    }

    fn parse_yield(&mut self) -> NodeId {
        let node = self.ast.new_node(Token::Yield, self.span());
        self.bump();
        let ends = matches!(
            self.tok(),
            TokenKind::Semicolon
                | TokenKind::CloseParen
                | TokenKind::CloseBracket
                | TokenKind::CloseBrace
                | TokenKind::Comma
                | TokenKind::EndOfFile
        );
        if !ends && !self.scanner.has_preceding_line_break() {
            self.eat(TokenKind::Asterisk);
            let operand = self.parse_assignment();
            self.ast.append_child(node, operand);
        }
        node
    }

    fn parse_semicolon(&mut self) {
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        if self.at(TokenKind::CloseBrace)
            || self.at(TokenKind::EndOfFile)
            || self.scanner.has_preceding_line_break()
        {
            return;
        }
        self.error(&messages::_0_EXPECTED, &[";"]);
    }
}
