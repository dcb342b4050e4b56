//! Counting read/write loops.
//!
//! `Read::read_exact` and `Write::write_all` discard how far they got before
//! failing. The stream engine reports partial counts, so it goes through these
//! instead.

use std::io::{self, Read, Write};

/// Reads until `buf` is full or the reader reports end of stream.
///
/// Returns the number of bytes read. A count below `buf.len()` means end of
/// stream was reached.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes all of `buf`, adding every accepted byte to `total` as it goes.
pub fn write_counted<W: Write + ?Sized>(
    writer: &mut W,
    mut buf: &[u8],
    total: &mut u64,
) -> io::Result<()> {
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ));
            }
            Ok(n) => {
                *total += n as u64;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Accepts at most `limit` bytes, then refuses further writes.
    struct LimitedWriter {
        data: Vec<u8>,
        limit: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit - self.data.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_full_stops_at_eof() -> io::Result<()> {
        let mut reader = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];

        assert_eq!(read_full(&mut reader, &mut buf)?, 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(read_full(&mut reader, &mut buf)?, 0);
        Ok(())
    }

    #[test]
    fn write_counted_reports_partial_progress() {
        let mut writer = LimitedWriter {
            data: Vec::new(),
            limit: 5,
        };
        let mut total = 0;

        let err = write_counted(&mut writer, &[7u8; 8], &mut total).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(total, 5);
        assert_eq!(writer.data, vec![7u8; 5]);
    }
}
