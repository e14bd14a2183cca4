//! Node flags.

bitflags::bitflags! {
    /// Boolean properties attached to AST nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u16 {
        const NONE             = 0;
        /// `async` function or arrow.
        const ASYNC            = 1 << 0;
        /// Generator function.
        const GENERATOR        = 1 << 1;
        /// Static class member.
        const STATIC           = 1 << 2;
        /// Postfix `++`/`--`.
        const POSTFIX          = 1 << 3;
        /// The name is a constant by coding convention. Stripped by the
        /// inline renamer when `remove_const` is set.
        const IS_CONSTANT_NAME = 1 << 4;
        /// The string key was written with quotes.
        const QUOTED           = 1 << 5;
        /// The string key came from shorthand `{x}` and was expanded to
        /// `x: x` during parsing.
        const SHORTHAND        = 1 << 6;
        /// `export default`.
        const EXPORT_DEFAULT   = 1 << 7;
    }
}
