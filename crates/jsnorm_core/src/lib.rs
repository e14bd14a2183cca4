//! jsnorm_core: shared infrastructure for the jsnorm toolkit.
//!
//! String interning, insertion-ordered collections, source text spans, and
//! the resettable unique-id supplier used to mint rename suffixes.

pub mod collections;
pub mod intern;
pub mod text;
pub mod unique;
