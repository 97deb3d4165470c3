//! Destinations for encoded lines.

use std::io::Write;

use gix_packetline_blocking::encode::{data_to_write, flush_to_write};

/// A destination that frames each line it receives and knows how to end a message.
pub trait LineSink {
    /// Write `line`, which includes its trailing newline, as one frame.
    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()>;
    /// Write the frame that ends the current message.
    fn write_flush(&mut self) -> std::io::Result<()>;
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        (**self).write_line(line)
    }

    fn write_flush(&mut self) -> std::io::Result<()> {
        (**self).write_flush()
    }
}

/// A [`LineSink`] writing pkt-lines: each line is prefixed with its length as four hex digits,
/// and a message ends with the `0000` flush packet.
#[derive(Debug)]
pub struct PacketLineSink<W> {
    inner: W,
}

impl<W: Write> PacketLineSink<W> {
    /// Create a new instance writing into `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Get access to the underlying writer.
    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LineSink for PacketLineSink<W> {
    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        data_to_write(line, &mut self.inner).map(|_| ())
    }

    fn write_flush(&mut self) -> std::io::Result<()> {
        flush_to_write(&mut self.inner).map(|_| ())
    }
}
