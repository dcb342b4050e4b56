use std::io::{self, Seek, SeekFrom, Write};

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub fn create_progress_bar(multi: &MultiProgress, total_bytes: Option<u64>) -> Result<ProgressBar> {
    let pb = if let Some(total) = total_bytes {
        let pb = multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} ({percent}%)\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}",
        )?);

        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    } else {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} {bytes}\n{msg} | elapsed: {elapsed_precise}",
        )?);

        pb
    };
    Ok(pb)
}

/// Advances a progress bar by every byte written through it.
pub struct ProgressWriter<W> {
    inner: W,
    pb: Option<ProgressBar>,
}

impl<W> ProgressWriter<W> {
    pub fn new(inner: W, pb: Option<ProgressBar>) -> Self {
        Self { inner, pb }
    }

    pub fn set_message(&self, msg: &'static str) {
        if let Some(ref pb) = self.pb {
            pb.set_message(msg);
        }
    }

    /// Finishes the bar and returns the wrapped writer.
    pub fn finish(self) -> W {
        if let Some(ref pb) = self.pb {
            pb.finish_and_clear();
        }
        self.inner
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if let Some(ref pb) = self.pb {
            pb.inc(n as u64);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Seek> Seek for ProgressWriter<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
