// Raw PCM output, samples only

use std::io::{self, Write};

use super::{ContainerWriter, PcmFormat};

/// Writes decoded samples with no container framing
pub struct RawWriter<W: Write> {
    sink: W,
    data_len: u64,
    closed: bool,
}

impl<W: Write> RawWriter<W> {
    pub fn new(sink: W) -> Self {
        RawWriter {
            sink,
            data_len: 0,
            closed: false,
        }
    }
}

impl<W: Write> ContainerWriter for RawWriter<W> {
    fn write_header(&mut self, _format: Option<&PcmFormat>) -> io::Result<()> {
        Ok(())
    }

    fn write_packet(&mut self, buf: &[u8]) -> io::Result<()> {
        self.sink.write_all(buf)?;
        self.data_len += buf.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.flush()
    }

    fn bytes_written(&self) -> u64 {
        self.data_len
    }
}
