use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom, StdinLock};
use std::path::Path;

use anyhow::{Context, Result};

/// Unified input that handles both file and pipe input
pub enum InputReader {
    File(BufReader<File>),
    /// Standard input, read as it arrives.
    Pipe(StdinLock<'static>),
    /// Standard input, read to the end up front so it can be seeked.
    Buffered(Cursor<Vec<u8>>),
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();
        if is_pipe_path(path) {
            log::info!("Now listening from pipe");
            Ok(Self::Pipe(io::stdin().lock()))
        } else {
            let file = File::open(path).with_context(|| path.display().to_string())?;
            Ok(Self::File(BufReader::new(file)))
        }
    }

    /// Like [`InputReader::new`], but pipe input is buffered in memory so the
    /// reader always supports seeking.
    pub fn seekable<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        match Self::new(input_path)? {
            Self::Pipe(mut stdin) => {
                let mut data = Vec::new();
                stdin.read_to_end(&mut data)?;
                log::debug!("Buffered {} bytes from pipe", data.len());
                Ok(Self::Buffered(Cursor::new(data)))
            }
            reader => Ok(reader),
        }
    }

    /// Total input size in bytes, when known.
    pub fn total_bytes(&self) -> Option<u64> {
        match self {
            Self::File(reader) => reader.get_ref().metadata().ok().map(|m| m.len()),
            Self::Pipe(_) => None,
            Self::Buffered(cursor) => Some(cursor.get_ref().len() as u64),
        }
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(reader) => reader.read(buf),
            Self::Pipe(reader) => reader.read(buf),
            Self::Buffered(reader) => reader.read(buf),
        }
    }
}

impl Seek for InputReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(reader) => reader.seek(pos),
            Self::Pipe(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "standard input can not be seeked",
            )),
            Self::Buffered(reader) => reader.seek(pos),
        }
    }
}

pub fn is_pipe_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_path() {
        let err = InputReader::new("no/such/dir/input.gam").err();
        let message = err.map(|e| format!("{e:#}")).unwrap_or_default();

        assert!(message.starts_with("no/such/dir/input.gam: "), "{message}");
    }
}
