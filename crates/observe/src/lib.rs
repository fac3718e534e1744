//! Logging setup shared by the binaries of this workspace.

pub mod tracing;
