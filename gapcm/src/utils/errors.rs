use std::io;

use crate::process::SECTOR_BYTES;

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error("A header can not be parsed: read {0} of {expected} bytes", expected = SECTOR_BYTES)]
    Truncated(usize),

    #[error("A header can not be parsed: {0}")]
    Io(#[from] io::Error),

    #[error("The format is invalid: {0:#06x}")]
    InvalidFormat(u16),

    #[error("The length is zero")]
    ZeroLength,

    #[error("The loop start position is more than the logical maximum: {mark} > {max}")]
    MarkTooLarge { mark: u32, max: u32 },

    #[error(
        "The stream length is less than or equal to the loop start position: loop end block {end} <= mark {mark}"
    )]
    LoopEndNotAfterMark { end: u32, mark: u32 },
}

/// Failure of a stream engine call.
///
/// I/O variants carry `written`, the count of output bytes produced before the
/// failure, so callers can still account for a truncated result.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("A read error has occurred after {written} output bytes: {source}")]
    Read { written: u64, source: io::Error },

    #[error("A write error has occurred after {written} output bytes: {source}")]
    Write { written: u64, source: io::Error },

    #[error("Seek failed after {written} output bytes: {source}")]
    Seek { written: u64, source: io::Error },
}

impl StreamError {
    /// Output bytes produced before the failure.
    pub fn written(&self) -> u64 {
        match self {
            StreamError::Header(_) => 0,
            StreamError::Read { written, .. }
            | StreamError::Write { written, .. }
            | StreamError::Seek { written, .. } => *written,
        }
    }

    /// Shifts the reported count by output produced in earlier phases.
    pub(crate) fn after(self, base: u64) -> Self {
        match self {
            StreamError::Header(e) => StreamError::Header(e),
            StreamError::Read { written, source } => StreamError::Read {
                written: base + written,
                source,
            },
            StreamError::Write { written, source } => StreamError::Write {
                written: base + written,
                source,
            },
            StreamError::Seek { written, source } => StreamError::Seek {
                written: base + written,
                source,
            },
        }
    }
}
