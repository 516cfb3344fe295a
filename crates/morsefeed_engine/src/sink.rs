use std::io::Write;
use std::ops::ControlFlow;

use morsefeed_core::StopReason;

use crate::FeedError;

/// Destination for laid-out rows: a file, stdout or the player process.
pub trait RowSink {
    fn write_text(&mut self, text: &str) -> Result<(), FeedError>;

    /// Terminates the current row. For the player this also waits for the
    /// row to be acknowledged.
    fn end_row(&mut self) -> Result<(), FeedError>;

    /// Checked before every word is written.
    fn poll_control(&mut self) -> Result<ControlFlow<StopReason>, FeedError> {
        Ok(ControlFlow::Continue(()))
    }

    /// Deals with a partial row left behind when the user quit.
    fn abandon_row(&mut self) -> Result<(), FeedError> {
        self.end_row()
    }

    fn close(&mut self) -> Result<(), FeedError>;
}

impl<S: RowSink + ?Sized> RowSink for Box<S> {
    fn write_text(&mut self, text: &str) -> Result<(), FeedError> {
        (**self).write_text(text)
    }

    fn end_row(&mut self) -> Result<(), FeedError> {
        (**self).end_row()
    }

    fn poll_control(&mut self) -> Result<ControlFlow<StopReason>, FeedError> {
        (**self).poll_control()
    }

    fn abandon_row(&mut self) -> Result<(), FeedError> {
        (**self).abandon_row()
    }

    fn close(&mut self) -> Result<(), FeedError> {
        (**self).close()
    }
}

/// Plain text output, flushed once per row.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowSink for WriterSink<W> {
    fn write_text(&mut self, text: &str) -> Result<(), FeedError> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn end_row(&mut self) -> Result<(), FeedError> {
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), FeedError> {
        self.out.flush()?;
        Ok(())
    }
}
