// RIFF/WAVE/PCM output
//
// hound owns the container layout: the header goes out when the format is known
// and `finalize` patches the RIFF and data lengths once the sample count is.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{self, Seek, Write};

use super::{ContainerWriter, PcmFormat};

/// Writer state; hound only takes the sink once the spec is known
enum State<W: Write + Seek> {
    Pending(W),
    Writing(WavWriter<W>),
    Closed,
}

/// Writes a standards-compliant 16-bit PCM WAVE file
pub struct WaveWriter<W: Write + Seek> {
    state: State<W>,
    data_len: u64,
}

impl<W: Write + Seek> WaveWriter<W> {
    pub fn new(sink: W) -> Self {
        WaveWriter {
            state: State::Pending(sink),
            data_len: 0,
        }
    }
}

fn hound_error(e: hound::Error) -> io::Error {
    match e {
        hound::Error::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
    }
}

impl<W: Write + Seek> ContainerWriter for WaveWriter<W> {
    fn write_header(&mut self, format: Option<&PcmFormat>) -> io::Result<()> {
        let format = format.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "WAVE output needs a PCM format")
        })?;
        if format.byte_rate().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} Hz with {} channel(s) does not fit a WAVE header",
                    format.sample_rate, format.channels
                ),
            ));
        }

        let sink = match std::mem::replace(&mut self.state, State::Closed) {
            State::Pending(sink) => sink,
            other => {
                self.state = other;
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "WAVE header already written",
                ));
            }
        };

        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        self.state = State::Writing(WavWriter::new(sink, spec).map_err(hound_error)?);
        Ok(())
    }

    fn write_packet(&mut self, buf: &[u8]) -> io::Result<()> {
        let writer = match &mut self.state {
            State::Writing(writer) => writer,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "WAVE samples written outside header and close",
                ))
            }
        };
        if buf.len() % 2 != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} bytes is not a whole number of 16-bit samples", buf.len()),
            ));
        }

        for pair in buf.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                .map_err(hound_error)?;
        }
        self.data_len += buf.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Writing(writer) => writer.finalize().map_err(hound_error),
            State::Pending(mut sink) => sink.flush(),
            State::Closed => Ok(()),
        }
    }

    fn bytes_written(&self) -> u64 {
        self.data_len
    }
}
