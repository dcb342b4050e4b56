//! Data structures representing format components.
//!
//! Contains the stream header record and the channel layout with its
//! per-channel block buffers.

pub mod channel;
pub mod header;
