//! Utility functions and supporting infrastructure.
//!
//! Provides the big-endian field reader, error types, and the counting I/O
//! loops used by the stream engine.

pub mod bitstream_io;
pub mod errors;
pub mod io;
