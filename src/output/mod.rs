// PCM output containers
//
// Decoded samples leave the pipeline through one of two writers: a canonical
// RIFF/WAVE/PCM file or unframed raw PCM. The variant is chosen once per
// conversion and every call after that is a plain match on the enum.

pub mod raw;
pub mod wave;

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

pub use raw::RawWriter;
pub use wave::WaveWriter;

/// Output container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutputKind {
    #[default]
    Wave,
    Raw,
}

impl OutputKind {
    /// Pick the container from a file extension, raw unless it is ".wav"
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => OutputKind::Wave,
            _ => OutputKind::Raw,
        }
    }
}

/// Layout of the decoded samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// 16-bit signed PCM, the only sample format Speex decodes to
    pub fn s16(sample_rate: u32, channels: u16) -> Self {
        PcmFormat {
            sample_rate,
            channels,
            bits_per_sample: 16,
        }
    }

    /// Bytes per sample frame, `None` if it overflows the WAVE field
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    /// Bytes per second, `None` if it overflows the WAVE field
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(self.block_align()? as u32)
    }
}

/// Write side of an output container
pub trait ContainerWriter {
    /// Emit any container preamble; `None` when the container has no use for it
    fn write_header(&mut self, format: Option<&PcmFormat>) -> io::Result<()>;

    /// Append decoded samples
    fn write_packet(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Finalize trailers and length fields and flush; later calls are no-ops
    fn close(&mut self) -> io::Result<()>;

    /// PCM bytes written so far, excluding container framing
    fn bytes_written(&self) -> u64;
}

/// One of the supported PCM output containers
pub enum PcmWriter<W: Write + Seek> {
    Wave(WaveWriter<W>),
    Raw(RawWriter<W>),
}

impl<W: Write + Seek> PcmWriter<W> {
    pub fn new(kind: OutputKind, sink: W) -> Self {
        match kind {
            OutputKind::Wave => PcmWriter::Wave(WaveWriter::new(sink)),
            OutputKind::Raw => PcmWriter::Raw(RawWriter::new(sink)),
        }
    }

    pub fn kind(&self) -> OutputKind {
        match self {
            PcmWriter::Wave(_) => OutputKind::Wave,
            PcmWriter::Raw(_) => OutputKind::Raw,
        }
    }

}

impl PcmWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and wrap it in the requested container
    pub fn open<P: AsRef<Path>>(kind: OutputKind, path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(PcmWriter::new(kind, BufWriter::new(file)))
    }
}

impl<W: Write + Seek> ContainerWriter for PcmWriter<W> {
    fn write_header(&mut self, format: Option<&PcmFormat>) -> io::Result<()> {
        match self {
            PcmWriter::Wave(w) => w.write_header(format),
            PcmWriter::Raw(w) => w.write_header(format),
        }
    }

    fn write_packet(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            PcmWriter::Wave(w) => w.write_packet(buf),
            PcmWriter::Raw(w) => w.write_packet(buf),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self {
            PcmWriter::Wave(w) => w.close(),
            PcmWriter::Raw(w) => w.close(),
        }
    }

    fn bytes_written(&self) -> u64 {
        match self {
            PcmWriter::Wave(w) => w.bytes_written(),
            PcmWriter::Raw(w) => w.bytes_written(),
        }
    }
}
