#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Transcoder between GA PCM streams and raw interleaved 8-bit PCM.
//!
//! ### Stream Organization
//!
//! A stream is a sequence of 2048-byte sectors. The first sector is the
//! [`structs::header::Header`]; every following sector carries one block of
//! 1024 samples for a single channel. Stereo streams alternate left and right
//! sectors.
//!
//! ### Sample Encoding
//!
//! Each sample takes a padding byte and a sign-magnitude sample byte. On the
//! consumer side samples are offset binary around a configurable origin, see
//! [`process::PcmConfig`].
//!
//! ### Looping
//!
//! The header marks a loop region between the `mark` block and the `length`
//! frame. Decoding plays the region before the mark once and the loop region
//! a requested number of times.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use gapcm::process::{decode::Decoder, encode::Encoder};
//! use gapcm::structs::header::Header;
//!
//! let pcm: Vec<u8> = (0..4000u32).map(|i| (i % 256) as u8).collect();
//! let header = Header { format: 2, mark: 1, length: 4000, ..Default::default() };
//! header.validate()?;
//!
//! let mut stream = Vec::new();
//! Encoder::default().encode_stream(&header, &mut pcm.as_slice(), &mut stream, false)?;
//!
//! let mut source = Cursor::new(stream);
//! let header = Header::read_from(&mut source)?;
//! let mut output = Vec::new();
//! Decoder::default().decode_stream(&header, &mut source, &mut output, 2)?;
//!
//! // intro once, loop region twice
//! assert_eq!(output.len() as u64, header.mark_samples() + 2 * header.loop_samples());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Big-endian serialization used by the header writer.
pub mod byteorder;

/// Stream processing.
///
/// 1. **Transcoding** ([`process::transcode`]): One sample between game and
///    consumer form.
///
/// 2. **Sectors** ([`process::sector`]): One channel block per sector.
///
/// 3. **Decoding** ([`process::decode`]) and **Encoding**
///    ([`process::encode`]): Whole streams, with looping and pregap silence.
pub mod process;

/// Data structures representing GA PCM format components.
///
/// - **Header** ([`structs::header`]): The leading sector of a stream
/// - **Channels** ([`structs::channel`]): Layouts and block buffers
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Field reading
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **Counting I/O** ([`utils::io`]): Read and write loops that keep counts
pub mod utils;
