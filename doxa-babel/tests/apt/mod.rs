//! APT format tests
//!
//! Parsing of whole documents, writing them back out, and nesting discipline.

mod import;
mod nesting;
mod roundtrip;
