//! Binary operator precedence.

use jsnorm_ast::Token;
use jsnorm_scanner::TokenKind;

/// Precedence levels for binary operators. Higher binds tighter.
pub mod levels {
    pub const COALESCE: u8 = 4;
    pub const LOGICAL_OR: u8 = 5;
    pub const LOGICAL_AND: u8 = 6;
    pub const BITWISE_OR: u8 = 7;
    pub const BITWISE_XOR: u8 = 8;
    pub const BITWISE_AND: u8 = 9;
    pub const EQUALITY: u8 = 10;
    pub const RELATIONAL: u8 = 11;
    pub const SHIFT: u8 = 12;
    pub const ADDITIVE: u8 = 13;
    pub const MULTIPLICATIVE: u8 = 14;
    pub const EXPONENT: u8 = 15;
}

/// Map a scanned operator to its AST token and precedence. Returns `None`
/// for non-binary tokens.
pub fn binary_operator(kind: TokenKind) -> Option<(Token, u8)> {
    use levels::*;
    let entry = match kind {
        TokenKind::QuestionQuestion => (Token::Coalesce, COALESCE),
        TokenKind::BarBar => (Token::Or, LOGICAL_OR),
        TokenKind::AmpersandAmpersand => (Token::And, LOGICAL_AND),
        TokenKind::Bar => (Token::BitOr, BITWISE_OR),
        TokenKind::Caret => (Token::BitXor, BITWISE_XOR),
        TokenKind::Ampersand => (Token::BitAnd, BITWISE_AND),
        TokenKind::EqualsEquals => (Token::Eq, EQUALITY),
        TokenKind::ExclamationEquals => (Token::Ne, EQUALITY),
        TokenKind::EqualsEqualsEquals => (Token::StrictEq, EQUALITY),
        TokenKind::ExclamationEqualsEquals => (Token::StrictNe, EQUALITY),
        TokenKind::LessThan => (Token::Lt, RELATIONAL),
        TokenKind::GreaterThan => (Token::Gt, RELATIONAL),
        TokenKind::LessThanEquals => (Token::Le, RELATIONAL),
        TokenKind::GreaterThanEquals => (Token::Ge, RELATIONAL),
        TokenKind::InKeyword => (Token::In, RELATIONAL),
        TokenKind::InstanceOfKeyword => (Token::InstanceOf, RELATIONAL),
        TokenKind::LessThanLessThan => (Token::Lsh, SHIFT),
        TokenKind::GreaterThanGreaterThan => (Token::Rsh, SHIFT),
        TokenKind::GreaterThanGreaterThanGreaterThan => (Token::Ursh, SHIFT),
        TokenKind::Plus => (Token::Add, ADDITIVE),
        TokenKind::Minus => (Token::Sub, ADDITIVE),
        TokenKind::Asterisk => (Token::Mul, MULTIPLICATIVE),
        TokenKind::Slash => (Token::Div, MULTIPLICATIVE),
        TokenKind::Percent => (Token::Mod, MULTIPLICATIVE),
        TokenKind::AsteriskAsterisk => (Token::Exponent, EXPONENT),
        _ => return None,
    };
    Some(entry)
}

/// Map a scanned assignment operator to its AST token.
pub fn assignment_operator(kind: TokenKind) -> Option<Token> {
    let token = match kind {
        TokenKind::Equals => Token::Assign,
        TokenKind::PlusEquals => Token::AssignAdd,
        TokenKind::MinusEquals => Token::AssignSub,
        TokenKind::AsteriskEquals => Token::AssignMul,
        TokenKind::AsteriskAsteriskEquals => Token::AssignExponent,
        TokenKind::SlashEquals => Token::AssignDiv,
        TokenKind::PercentEquals => Token::AssignMod,
        TokenKind::LessThanLessThanEquals => Token::AssignLsh,
        TokenKind::GreaterThanGreaterThanEquals => Token::AssignRsh,
        TokenKind::GreaterThanGreaterThanGreaterThanEquals => Token::AssignUrsh,
        TokenKind::AmpersandEquals => Token::AssignBitAnd,
        TokenKind::BarEquals => Token::AssignBitOr,
        TokenKind::CaretEquals => Token::AssignBitXor,
        _ => return None,
    };
    Some(token)
}

/// Map a prefix operator to its AST token.
pub fn unary_operator(kind: TokenKind) -> Option<Token> {
    let token = match kind {
        TokenKind::Exclamation => Token::Not,
        TokenKind::Tilde => Token::BitNot,
        TokenKind::Plus => Token::Pos,
        TokenKind::Minus => Token::Neg,
        TokenKind::TypeOfKeyword => Token::TypeOf,
        TokenKind::VoidKeyword => Token::Void,
        TokenKind::DeleteKeyword => Token::DelProp,
        _ => return None,
    };
    Some(token)
}
