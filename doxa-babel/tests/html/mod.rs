//! HTML format tests
//!
//! Tests for APT → HTML export through the registry.

mod export;
