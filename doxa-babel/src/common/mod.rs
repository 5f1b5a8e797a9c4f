//! Helpers shared by several parsers and renderers.

pub mod escape;
pub mod ids;
pub mod links;
pub mod xhtml;
