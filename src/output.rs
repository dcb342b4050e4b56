use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, StdoutLock, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::input::is_pipe_path;

/// Unified output that handles both file and pipe output with buffered writing
pub enum OutputWriter {
    File(BufWriter<File>),
    Pipe(BufWriter<StdoutLock<'static>>),
}

impl OutputWriter {
    /// Create a new OutputWriter from a path
    /// Use "-" for stdout pipe output
    pub fn create<P: AsRef<Path>>(output_path: P) -> Result<Self> {
        let path = output_path.as_ref();
        if is_pipe_path(path) {
            Ok(Self::Pipe(BufWriter::new(io::stdout().lock())))
        } else {
            let file = File::create(path).with_context(|| path.display().to_string())?;
            Ok(Self::File(BufWriter::new(file)))
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(writer) => writer.write(buf),
            Self::Pipe(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(writer) => writer.flush(),
            Self::Pipe(writer) => writer.flush(),
        }
    }
}

impl Seek for OutputWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(writer) => writer.seek(pos),
            Self::Pipe(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "standard output can not be seeked",
            )),
        }
    }
}
