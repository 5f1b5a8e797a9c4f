//! Format implementations
//!
//! Parsing formats (apt, xdoc, fml) produce the event stream; serializing formats
//! (apt, html, fo, tag, and pdf with `native-export`) render it.

pub mod apt;
pub mod fml;
pub mod fo;
pub mod html;
pub mod tag;
pub mod xdoc;

pub use apt::AptFormat;
pub use fml::FmlFormat;
#[cfg(feature = "native-export")]
pub use fo::pdf::FoPdfFormat;
pub use fo::{FoFormat, FoOptions};
pub use html::{HtmlFormat, HtmlOptions};
pub use tag::TagFormat;
pub use xdoc::XdocFormat;
