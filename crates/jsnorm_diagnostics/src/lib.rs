//! jsnorm_diagnostics: diagnostic messages and reporting infrastructure.
//!
//! The scanner and parser report user-facing problems through a
//! [`DiagnosticCollection`]; the rename pipeline only surfaces diagnostics
//! through the optional reporting redeclaration handler.

use jsnorm_core::text::TextSpan;
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a stable code.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// May contain `{0}`, `{1}`, … placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} JSN{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a message template by substituting `{0}`, `{1}`, … with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during a run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort by file, then position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.start).unwrap_or(0);
            let b_pos = b.span.map(|s| s.start).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

// ============================================================================
// Diagnostic messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // Scanner (1000-1099)
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!(1002, Error, "Unterminated string literal.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1003, Error, "Invalid character.");
    pub const UNEXPECTED_END_OF_TEXT: DiagnosticMessage =
        diag!(1004, Error, "Unexpected end of text.");
    pub const TEMPLATE_LITERALS_NOT_SUPPORTED: DiagnosticMessage =
        diag!(1005, Error, "Template literals are not supported.");
    pub const HEXADECIMAL_DIGIT_EXPECTED: DiagnosticMessage =
        diag!(1006, Error, "Hexadecimal digit expected.");

    // Parser (1100-1199)
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1100, Error, "'{0}' expected.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1101, Error, "Identifier expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1102, Error, "Expression expected.");
    pub const STATEMENT_EXPECTED: DiagnosticMessage =
        diag!(1103, Error, "Declaration or statement expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1104, Error, "Unexpected token.");
    pub const VARIABLE_DECLARATION_EXPECTED: DiagnosticMessage =
        diag!(1105, Error, "Variable declaration expected.");
    pub const A_REST_PARAMETER_MUST_BE_LAST: DiagnosticMessage =
        diag!(1106, Error, "A rest parameter must be last in a parameter list.");
    pub const CASE_OR_DEFAULT_EXPECTED: DiagnosticMessage =
        diag!(1107, Error, "'case' or 'default' expected.");
    pub const STRING_LITERAL_EXPECTED: DiagnosticMessage =
        diag!(1108, Error, "String literal expected.");
    pub const CATCH_OR_FINALLY_EXPECTED: DiagnosticMessage =
        diag!(1109, Error, "'catch' or 'finally' expected.");
    pub const PROPERTY_ASSIGNMENT_EXPECTED: DiagnosticMessage =
        diag!(1110, Error, "Property assignment expected.");
    pub const _0_IS_NOT_AVAILABLE_IN_LANGUAGE_MODE_1: DiagnosticMessage =
        diag!(1111, Error, "'{0}' is not available when targeting {1}.");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage =
        diag!(1112, Error, "Invalid assignment target.");

    // Renaming (1300-1399)
    pub const REDECLARATION_OF_0: DiagnosticMessage =
        diag!(1300, Warning, "Redeclaration of '{0}'.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("'{0}' expected.", &[";"]), "';' expected.");
        assert_eq!(
            format_message("'{0}' vs '{1}'", &["a", "b"]),
            "'a' vs 'b'"
        );
    }

    #[test]
    fn test_collection_error_count() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::new(&messages::UNEXPECTED_TOKEN, &[]));
        diags.add(Diagnostic::new(&messages::REDECLARATION_OF_0, &["x"]));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.error_count(), 1);
        assert!(diags.has_errors());
    }
}
