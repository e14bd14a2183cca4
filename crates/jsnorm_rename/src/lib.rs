//! jsnorm_rename: the identifier-uniquifying pass and its inverter.
//!
//! Forward direction ([`uniquify`]): rewrite locally-declared names so no
//! two distinct declarations in a module share a textual name, either only
//! on collision (contextual) or unconditionally (inline). Reverse direction
//! ([`invert`]): strip `$jscomp$N` suffixes where removal cannot collide.

pub mod convention;
pub mod invert;
pub mod uniquify;

pub use convention::{annotate_constant_names, CodingConvention, DefaultCodingConvention};
pub use invert::RenameInverter;
pub use uniquify::{NameUniquifier, ReportingRedeclarationHandler, UNIQUE_NAME_SEPARATOR};
