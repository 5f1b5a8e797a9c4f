//! XML dialect tests
//!
//! XDoc and FML sources converted through the registry.

mod fml;
mod xdoc;
