//! Library side of the `doxa` binary, shared with its integration tests.

pub mod transforms;
