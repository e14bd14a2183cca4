//! The scanner implementation.

use crate::token::{keyword_kind, TokenFlags, TokenKind};
use jsnorm_core::text::TextSpan;
use jsnorm_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// Scans one source file. State is the current token; call [`scan`](Scanner::scan)
/// to advance. `Clone` gives the parser cheap speculative lookahead: clone,
/// skim ahead, and drop the clone.
#[derive(Clone)]
pub struct Scanner {
    source: Vec<char>,
    pos: usize,
    token: TokenKind,
    token_start: usize,
    token_end: usize,
    token_text: String,
    token_flags: TokenFlags,
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            token: TokenKind::Unknown,
            token_start: 0,
            token_end: 0,
            token_text: String::new(),
            token_flags: TokenFlags::NONE,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    // ========================================================================
    // Current-token accessors
    // ========================================================================

    #[inline]
    pub fn token(&self) -> TokenKind {
        self.token
    }

    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn token_end(&self) -> u32 {
        self.token_end as u32
    }

    pub fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start(), self.token_end())
    }

    /// The text of an identifier, string, or numeric literal token.
    pub fn token_text(&self) -> &str {
        &self.token_text
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn peek(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn error(&mut self, message: &jsnorm_diagnostics::DiagnosticMessage) {
        let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
        self.diagnostics
            .add(Diagnostic::with_location(String::new(), span, message, &[]));
    }

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> TokenKind {
        self.token_flags = TokenFlags::NONE;
        self.skip_trivia();
        self.token_start = self.pos;
        self.token_text.clear();

        let kind = match self.peek(0) {
            None => TokenKind::EndOfFile,
            Some(c) => self.scan_from(c),
        };

        self.token_end = self.pos;
        self.token = kind;
        kind
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek(0) {
                Some(c) if c == '\n' || c == '\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek(1) == Some('*') => {
                    self.pos += 2;
                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(c), _) => {
                                if c == '\n' {
                                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                                }
                                self.pos += 1;
                            }
                            (None, _) => {
                                self.error(&messages::UNEXPECTED_END_OF_TEXT);
                                break;
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_from(&mut self, c: char) -> TokenKind {
        if is_identifier_start(c) {
            return self.scan_identifier();
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '"' || c == '\'' {
            return self.scan_string(c);
        }

        self.pos += 1;
        match c {
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '.' => {
                if self.peek(0) == Some('.') && self.peek(1) == Some('.') {
                    self.pos += 2;
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '?' => {
                if self.peek(0) == Some('?') {
                    self.pos += 1;
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            '=' => match self.peek(0) {
                Some('>') => {
                    self.pos += 1;
                    TokenKind::EqualsGreaterThan
                }
                Some('=') => {
                    self.pos += 1;
                    if self.peek(0) == Some('=') {
                        self.pos += 1;
                        TokenKind::EqualsEqualsEquals
                    } else {
                        TokenKind::EqualsEquals
                    }
                }
                _ => TokenKind::Equals,
            },
            '!' => {
                if self.peek(0) == Some('=') {
                    self.pos += 1;
                    if self.peek(0) == Some('=') {
                        self.pos += 1;
                        TokenKind::ExclamationEqualsEquals
                    } else {
                        TokenKind::ExclamationEquals
                    }
                } else {
                    TokenKind::Exclamation
                }
            }
            '+' => match self.peek(0) {
                Some('+') => {
                    self.pos += 1;
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::PlusEquals
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek(0) {
                Some('-') => {
                    self.pos += 1;
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::MinusEquals
                }
                _ => TokenKind::Minus,
            },
            '*' => match self.peek(0) {
                Some('*') => {
                    self.pos += 1;
                    if self.peek(0) == Some('=') {
                        self.pos += 1;
                        TokenKind::AsteriskAsteriskEquals
                    } else {
                        TokenKind::AsteriskAsterisk
                    }
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::AsteriskEquals
                }
                _ => TokenKind::Asterisk,
            },
            '/' => {
                if self.peek(0) == Some('=') {
                    self.pos += 1;
                    TokenKind::SlashEquals
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.peek(0) == Some('=') {
                    self.pos += 1;
                    TokenKind::PercentEquals
                } else {
                    TokenKind::Percent
                }
            }
            '<' => match self.peek(0) {
                Some('<') => {
                    self.pos += 1;
                    if self.peek(0) == Some('=') {
                        self.pos += 1;
                        TokenKind::LessThanLessThanEquals
                    } else {
                        TokenKind::LessThanLessThan
                    }
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::LessThanEquals
                }
                _ => TokenKind::LessThan,
            },
            '>' => match self.peek(0) {
                Some('>') => {
                    self.pos += 1;
                    match self.peek(0) {
                        Some('>') => {
                            self.pos += 1;
                            if self.peek(0) == Some('=') {
                                self.pos += 1;
                                TokenKind::GreaterThanGreaterThanGreaterThanEquals
                            } else {
                                TokenKind::GreaterThanGreaterThanGreaterThan
                            }
                        }
                        Some('=') => {
                            self.pos += 1;
                            TokenKind::GreaterThanGreaterThanEquals
                        }
                        _ => TokenKind::GreaterThanGreaterThan,
                    }
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::GreaterThanEquals
                }
                _ => TokenKind::GreaterThan,
            },
            '&' => match self.peek(0) {
                Some('&') => {
                    self.pos += 1;
                    TokenKind::AmpersandAmpersand
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::AmpersandEquals
                }
                _ => TokenKind::Ampersand,
            },
            '|' => match self.peek(0) {
                Some('|') => {
                    self.pos += 1;
                    TokenKind::BarBar
                }
                Some('=') => {
                    self.pos += 1;
                    TokenKind::BarEquals
                }
                _ => TokenKind::Bar,
            },
            '^' => {
                if self.peek(0) == Some('=') {
                    self.pos += 1;
                    TokenKind::CaretEquals
                } else {
                    TokenKind::Caret
                }
            }
            '`' => {
                self.error(&messages::TEMPLATE_LITERALS_NOT_SUPPORTED);
                TokenKind::Unknown
            }
            _ => {
                self.error(&messages::INVALID_CHARACTER);
                TokenKind::Unknown
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        while let Some(c) = self.peek(0) {
            if is_identifier_part(c) {
                self.token_text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        keyword_kind(&self.token_text).unwrap_or(TokenKind::Identifier)
    }

    fn scan_number(&mut self) -> TokenKind {
        // Hex literals.
        if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x') | Some('X')) {
            self.token_text.push('0');
            self.token_text.push(self.peek(1).unwrap());
            self.pos += 2;
            let mut saw_digit = false;
            while let Some(c) = self.peek(0) {
                if c.is_ascii_hexdigit() {
                    self.token_text.push(c);
                    self.pos += 1;
                    saw_digit = true;
                } else {
                    break;
                }
            }
            if !saw_digit {
                self.error(&messages::HEXADECIMAL_DIGIT_EXPECTED);
            }
            return TokenKind::NumericLiteral;
        }

        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() {
                self.token_text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.peek(0) == Some('.') && self.peek(1).map_or(false, |c| c.is_ascii_digit()) {
            self.token_text.push('.');
            self.pos += 1;
            while let Some(c) = self.peek(0) {
                if c.is_ascii_digit() {
                    self.token_text.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.peek(lookahead).map_or(false, |c| c.is_ascii_digit()) {
                for _ in 0..lookahead {
                    self.token_text.push(self.peek(0).unwrap());
                    self.pos += 1;
                }
                while let Some(c) = self.peek(0) {
                    if c.is_ascii_digit() {
                        self.token_text.push(c);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }
        TokenKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => {
                    self.error(&messages::UNTERMINATED_STRING_LITERAL);
                    break;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some('\n') => {
                    self.error(&messages::UNTERMINATED_STRING_LITERAL);
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek(0) {
                        Some('n') => self.token_text.push('\n'),
                        Some('t') => self.token_text.push('\t'),
                        Some('r') => self.token_text.push('\r'),
                        Some('0') => self.token_text.push('\0'),
                        Some(c) => self.token_text.push(c),
                        None => {
                            self.error(&messages::UNTERMINATED_STRING_LITERAL);
                            break;
                        }
                    }
                    self.pos += 1;
                }
                Some(c) => {
                    self.token_text.push(c);
                    self.pos += 1;
                }
            }
        }
        TokenKind::StringLiteral
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let kind = scanner.scan();
            if kind == TokenKind::EndOfFile {
                break;
            }
            out.push(kind);
        }
        out
    }

    #[test]
    fn test_scan_statement() {
        assert_eq!(
            kinds("var a = 1;"),
            vec![
                TokenKind::VarKeyword,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::NumericLiteral,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_dollar_identifiers() {
        let mut scanner = Scanner::new("a$jscomp$1");
        assert_eq!(scanner.scan(), TokenKind::Identifier);
        assert_eq!(scanner.token_text(), "a$jscomp$1");
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(
            kinds("a === b >>> c ** d ?? e => f ... ++"),
            vec![
                TokenKind::Identifier,
                TokenKind::EqualsEqualsEquals,
                TokenKind::Identifier,
                TokenKind::GreaterThanGreaterThanGreaterThan,
                TokenKind::Identifier,
                TokenKind::AsteriskAsterisk,
                TokenKind::Identifier,
                TokenKind::QuestionQuestion,
                TokenKind::Identifier,
                TokenKind::EqualsGreaterThan,
                TokenKind::Identifier,
                TokenKind::DotDotDot,
                TokenKind::PlusPlus,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let mut scanner = Scanner::new(r#"'a\nb'"#);
        assert_eq!(scanner.scan(), TokenKind::StringLiteral);
        assert_eq!(scanner.token_text(), "a\nb");
    }

    #[test]
    fn test_line_break_flag() {
        let mut scanner = Scanner::new("a\nb c");
        scanner.scan();
        assert!(!scanner.has_preceding_line_break());
        scanner.scan();
        assert!(scanner.has_preceding_line_break());
        scanner.scan();
        assert!(!scanner.has_preceding_line_break());
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            kinds("a // comment\n/* block */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_unterminated_string_reports() {
        let mut scanner = Scanner::new("'abc");
        scanner.scan();
        assert!(scanner.take_diagnostics().has_errors());
    }
}
