//! The coding convention consulted by the renamers.

use jsnorm_ast::{Ast, NodeFlags, NodeId, Token};

/// Naming conventions of the code being compiled. The inline renamer uses
/// [`is_exported_local`](CodingConvention::is_exported_local) to keep
/// generated names out of the reserved leading-underscore namespace, and
/// [`is_constant_name`](CodingConvention::is_constant_name) to find names
/// whose const-ness annotation `remove_const` should strip.
pub trait CodingConvention {
    /// Whether a name is a constant by convention.
    fn is_constant_name(&self, name: &str) -> bool;

    /// Whether a local name is reserved for export by convention.
    fn is_exported_local(&self, name: &str) -> bool;
}

/// The default convention: `CONSTANT_CASE` names are constants, and local
/// names starting with `_` are export-reserved.
#[derive(Debug, Default)]
pub struct DefaultCodingConvention;

impl CodingConvention for DefaultCodingConvention {
    fn is_constant_name(&self, name: &str) -> bool {
        !name.is_empty()
            && name.chars().any(|c| c.is_ascii_uppercase())
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '$')
    }

    fn is_exported_local(&self, name: &str) -> bool {
        name.starts_with('_')
    }
}

/// Mark every `Name` the convention considers constant with
/// `NodeFlags::IS_CONSTANT_NAME`. Run before an inline rename with
/// `remove_const` so the stripping is observable.
pub fn annotate_constant_names(ast: &mut Ast, root: NodeId, convention: &dyn CodingConvention) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if ast.token(node) == Token::Name && convention.is_constant_name(ast.text(node)) {
            ast.add_flags(node, NodeFlags::IS_CONSTANT_NAME);
        }
        let mut child = ast.first_child(node);
        while let Some(c) = child {
            stack.push(c);
            child = ast.next_sibling(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_names() {
        let convention = DefaultCodingConvention;
        assert!(convention.is_constant_name("CONST"));
        assert!(convention.is_constant_name("MAX_VALUE"));
        assert!(convention.is_constant_name("ACONST"));
        assert!(!convention.is_constant_name("Const"));
        assert!(!convention.is_constant_name("value"));
        assert!(!convention.is_constant_name("_"));
        assert!(!convention.is_constant_name(""));
    }

    #[test]
    fn test_exported_locals() {
        let convention = DefaultCodingConvention;
        assert!(convention.is_exported_local("_a"));
        assert!(convention.is_exported_local("__proto"));
        assert!(!convention.is_exported_local("a"));
        assert!(!convention.is_exported_local("$a"));
    }
}
