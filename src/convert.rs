// Decode orchestration
//
// Drives one conversion from a Speex container to a PCM container. The packet
// counter decides what each packet means:
//
// | packet | Ogg                      | WAVE / raw           |
// |--------|--------------------------|----------------------|
// | 0      | Speex header             | header from fmt/args |
// | 1      | comment packet, skipped  | audio                |
// | 2..    | audio                    | audio                |
//
// Running out of input is the normal way for a conversion to end, even in the
// middle of a page or packet. Every other failure aborts the conversion; the
// output writer is closed on both paths.

use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::decoder::FrameDecoder;
use crate::error::{Result, SpeexError};
use crate::loss::LossSimulator;
use crate::ogg::{OggPage, OGG_SIGNATURE};
use crate::output::{ContainerWriter, OutputKind, PcmFormat, PcmWriter};
use crate::speex::{
    cbr_packet_bytes, SpeexMode, SpeexStreamHeader, MAX_FRAMES_PER_PACKET, SPEEX_HEADER_SIZE,
};
use crate::utils::{read_or_eof, ReadOutcome};
use crate::wave::{SpeexWaveHeader, RIFF_ID};

/// Scratch space for decoded PCM, one second of 44.1 kHz 16-bit stereo
const PCM_BUFFER_SIZE: usize = 44100 * 2 * 2;

/// Input container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    Ogg,
    Wave,
    Raw,
}

impl SourceKind {
    /// Identify the container from its leading bytes; anything unknown is raw
    pub fn sniff(magic: &[u8]) -> Self {
        if magic.starts_with(OGG_SIGNATURE) {
            SourceKind::Ogg
        } else if magic.starts_with(RIFF_ID) {
            SourceKind::Wave
        } else {
            SourceKind::Raw
        }
    }

    /// Sniff a buffered reader without consuming anything
    pub fn detect<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        Ok(Self::sniff(reader.fill_buf()?))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Ogg => write!(f, "Ogg Speex"),
            SourceKind::Wave => write!(f, "Wave Speex"),
            SourceKind::Raw => write!(f, "Raw Speex"),
        }
    }
}

/// Stream parameters for raw Speex input, which carries no header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawStreamParams {
    pub mode: SpeexMode,
    pub sample_rate: u32,
    pub channels: u32,
    pub frames_per_packet: u32,
    /// Encoder quality (0-10), selects the packet size
    pub quality: u8,
    pub vbr: bool,
}

impl Default for RawStreamParams {
    fn default() -> Self {
        RawStreamParams {
            mode: SpeexMode::Narrowband,
            sample_rate: 8000,
            channels: 1,
            frames_per_packet: 1,
            quality: 8,
            vbr: false,
        }
    }
}

impl RawStreamParams {
    /// Header equivalent to what an Ogg or WAVE stream would have carried
    pub fn header(&self) -> Result<SpeexStreamHeader> {
        if self.frames_per_packet > MAX_FRAMES_PER_PACKET {
            return Err(SpeexError::MalformedHeader(format!(
                "{} frames per packet exceeds {}",
                self.frames_per_packet, MAX_FRAMES_PER_PACKET
            )));
        }
        Ok(SpeexStreamHeader {
            version: String::new(),
            version_id: 1,
            header_size: SPEEX_HEADER_SIZE as u32,
            sample_rate: self.sample_rate,
            mode: self.mode,
            bitstream_version: 4,
            channels: self.channels,
            bitrate: -1,
            frame_size: self.mode.frame_size() as u32,
            vbr: self.vbr,
            frames_per_packet: self.frames_per_packet,
            extra_headers: 0,
        })
    }

    /// Fixed packet size in bytes; VBR raw streams have none
    pub fn packet_bytes(&self) -> Result<u32> {
        if self.vbr {
            return Err(SpeexError::UnsupportedVbr);
        }
        Ok(cbr_packet_bytes(self.mode, self.quality))
    }
}

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertOptions {
    /// Perceptual enhancement in the decoder
    pub enhanced: bool,
    /// Simulated packet loss, 0-100
    pub loss_percent: u8,
    /// Seed for the loss simulator
    pub seed: Option<u64>,
    /// Fail on a first Ogg packet that is not a Speex header instead of skipping it
    pub strict_header: bool,
    /// Keep the output file when a file conversion fails
    pub keep_partial: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            enhanced: true,
            loss_percent: 0,
            seed: None,
            strict_header: false,
            keep_partial: false,
        }
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub source: SourceKind,
    pub output: OutputKind,
    pub header: SpeexStreamHeader,
    pub packets_decoded: u64,
    pub packets_lost: u64,
    pub pcm_bytes: u64,
}

/// Runs conversions against one frame decoder
pub struct Converter<'a, D: FrameDecoder + ?Sized> {
    decoder: &'a mut D,
    options: ConvertOptions,
    raw: RawStreamParams,
}

impl<'a, D: FrameDecoder + ?Sized> Converter<'a, D> {
    pub fn new(decoder: &'a mut D, options: ConvertOptions) -> Self {
        Converter {
            decoder,
            options,
            raw: RawStreamParams::default(),
        }
    }

    /// Parameters used when the source is raw Speex
    pub fn with_raw_params(mut self, raw: RawStreamParams) -> Self {
        self.raw = raw;
        self
    }

    /// Convert `input`; the output writer is closed on every path
    ///
    /// `open_output` is called once with the output kind, as soon as the stream
    /// header is known; no output exists for inputs rejected before that point.
    pub fn run<R, W, F>(
        &mut self,
        mut input: R,
        source: SourceKind,
        output: OutputKind,
        open_output: F,
    ) -> Result<ConversionSummary>
    where
        R: Read,
        W: Write + Seek,
        F: FnOnce(OutputKind) -> io::Result<PcmWriter<W>>,
    {
        let loss = LossSimulator::new(self.options.loss_percent, self.options.seed)?;
        debug!(
            loss_percent = loss.percent(),
            seeded = self.options.seed.is_some(),
            "packet loss simulation"
        );
        let mut session = DecodeSession {
            decoder: &mut *self.decoder,
            options: &self.options,
            loss,
            source,
            output,
            open_output: Some(open_output),
            writer: None,
            header: None,
            frames: 1,
            packet_index: 0,
            expected_body_bytes: 0,
            packets_decoded: 0,
            packets_lost: 0,
            pcm: vec![0u8; PCM_BUFFER_SIZE],
        };

        let result = match source {
            SourceKind::Ogg => session.run_ogg(&mut input),
            SourceKind::Wave => session.run_wave(&mut input),
            SourceKind::Raw => session.run_raw(&mut input, &self.raw),
        };

        match result {
            Ok(()) => session.finish(),
            Err(e) => {
                session.abort();
                Err(e)
            }
        }
    }
}

/// Running state of one conversion
struct DecodeSession<'s, D: FrameDecoder + ?Sized, W: Write + Seek, F> {
    decoder: &'s mut D,
    options: &'s ConvertOptions,
    loss: LossSimulator,
    source: SourceKind,
    output: OutputKind,
    open_output: Option<F>,
    writer: Option<PcmWriter<W>>,
    header: Option<SpeexStreamHeader>,
    frames: u32,
    packet_index: u64,
    expected_body_bytes: u32,
    packets_decoded: u64,
    packets_lost: u64,
    pcm: Vec<u8>,
}

impl<'s, D, W, F> DecodeSession<'s, D, W, F>
where
    D: FrameDecoder + ?Sized,
    W: Write + Seek,
    F: FnOnce(OutputKind) -> io::Result<PcmWriter<W>>,
{
    fn run_ogg<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        while let Some(page) = OggPage::read(reader)? {
            debug!(
                sequence = page.header.page_sequence,
                version = page.header.version,
                crc = page.header.crc,
                segments = page.segments.len(),
                "read Ogg page"
            );
            for segment in &page.segments {
                match self.packet_index {
                    0 => match SpeexStreamHeader::parse(segment) {
                        Ok(header) => {
                            self.start_stream(header)?;
                            self.packet_index = 1;
                        }
                        Err(e) if !self.options.strict_header => {
                            warn!(
                                page = page.header.page_sequence,
                                "skipping packet before Speex header: {}", e
                            );
                        }
                        Err(e) => return Err(e),
                    },
                    1 => {
                        debug!(bytes = segment.len(), "skipping comment packet");
                        self.packet_index += 1;
                    }
                    _ => {
                        self.decode_packet(segment)?;
                        self.packet_index += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn run_wave<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let wave = SpeexWaveHeader::read(reader)?;
        let format = &wave.format;
        if format.block_align == 0 {
            return Err(SpeexError::UnsupportedVbr);
        }
        if format.sample_rate != format.header.sample_rate
            || format.channels as u32 != format.header.channels
        {
            warn!(
                fmt_rate = format.sample_rate,
                fmt_channels = format.channels,
                "fmt chunk disagrees with embedded Speex header, using the header"
            );
        }
        debug!(data_size = wave.data_size, "found data chunk");

        self.expected_body_bytes = format.block_align as u32;
        self.start_stream(wave.format.header)?;
        self.packet_index = 1;

        // A zero size is what streaming writers leave behind
        let limit = match wave.data_size {
            0 => u64::MAX,
            size => size as u64,
        };
        self.run_fixed_packets(&mut reader.take(limit))
    }

    fn run_raw<R: Read>(&mut self, reader: &mut R, raw: &RawStreamParams) -> Result<()> {
        self.expected_body_bytes = raw.packet_bytes()?;
        self.start_stream(raw.header()?)?;
        self.packet_index = 1;
        self.run_fixed_packets(reader)
    }

    fn run_fixed_packets<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let mut payload = vec![0u8; self.expected_body_bytes as usize];
        while read_or_eof(reader, &mut payload)? == ReadOutcome::Filled {
            self.decode_packet(&payload)?;
            self.packet_index += 1;
        }
        Ok(())
    }

    /// Initialize the decoder and open the output once the header is known
    fn start_stream(&mut self, header: SpeexStreamHeader) -> Result<()> {
        debug!(
            format = %self.source,
            sample_rate = header.sample_rate,
            channels = header.channels,
            mode = %header.mode,
            frames_per_packet = header.frames_per_packet,
            "stream header"
        );

        let init_failed = || SpeexError::DecoderInitFailed {
            mode: header.mode.id(),
            sample_rate: header.sample_rate,
            channels: header.channels,
        };
        let channels = u16::try_from(header.channels).map_err(|_| init_failed())?;
        let format = PcmFormat::s16(header.sample_rate, channels);
        if format.byte_rate().is_none() {
            return Err(init_failed());
        }
        if !self.decoder.init(
            header.mode,
            header.sample_rate,
            header.channels,
            self.options.enhanced,
        ) {
            return Err(init_failed());
        }

        let open_output = self
            .open_output
            .take()
            .ok_or_else(|| SpeexError::Decode("output already opened".to_string()))?;
        let mut writer = open_output(self.output)?;
        debug!(
            output = ?writer.kind(),
            enhanced = self.options.enhanced,
            "opened output"
        );
        // Store before writing so the writer is closed even if the header write fails
        let header_result = writer.write_header(Some(&format));
        self.writer = Some(writer);
        header_result?;

        self.frames = header.frames();
        self.header = Some(header);
        Ok(())
    }

    /// Decode every sub-frame of one packet and write the resulting PCM
    fn decode_packet(&mut self, payload: &[u8]) -> Result<()> {
        if self.loss.next_is_lost() {
            self.decoder.decode(None, true)?;
            for _ in 1..self.frames {
                self.decoder.decode(None, true)?;
            }
            self.packets_lost += 1;
            debug!(packet = self.packet_index, bytes = payload.len(), "simulated packet loss");
        } else {
            self.decoder.decode(Some(payload), false)?;
            for _ in 1..self.frames {
                self.decoder.decode(None, false)?;
            }
        }
        self.packets_decoded += 1;

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SpeexError::Decode("audio packet before stream header".to_string()))?;
        loop {
            let decoded = self.decoder.drain(&mut self.pcm);
            if decoded == 0 {
                break;
            }
            writer.write_packet(&self.pcm[..decoded])?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<ConversionSummary> {
        let header = self.header.take().ok_or(SpeexError::MissingStreamHeader)?;
        let mut writer = self.writer.take().ok_or(SpeexError::MissingStreamHeader)?;
        let pcm_bytes = writer.bytes_written();
        writer.close()?;

        info!(
            packets = self.packets_decoded,
            lost = self.packets_lost,
            pcm_bytes,
            "conversion complete"
        );

        Ok(ConversionSummary {
            source: self.source,
            output: self.output,
            header,
            packets_decoded: self.packets_decoded,
            packets_lost: self.packets_lost,
            pcm_bytes,
        })
    }

    /// Close the writer after a fatal error, keeping the original error
    fn abort(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.close() {
                warn!("failed to close output after error: {}", e);
            }
        }
    }
}

/// Convert the file at `input` into `output`
///
/// `source` of `None` sniffs the container from the file's leading bytes. When
/// the conversion fails after the output file was created, the file is removed
/// unless `options.keep_partial` is set.
pub fn convert_file<D: FrameDecoder + ?Sized>(
    input: &Path,
    output: &Path,
    source: Option<SourceKind>,
    output_kind: OutputKind,
    raw: &RawStreamParams,
    options: &ConvertOptions,
    decoder: &mut D,
) -> Result<ConversionSummary> {
    let mut reader = BufReader::new(File::open(input)?);
    let source = match source {
        Some(kind) => kind,
        None => SourceKind::detect(&mut reader)?,
    };
    info!(input = %input.display(), output = %output.display(), %source, "converting");

    let created = Cell::new(false);
    let open_output = |kind: OutputKind| -> io::Result<PcmWriter<BufWriter<File>>> {
        let writer = PcmWriter::open(kind, output)?;
        created.set(true);
        Ok(writer)
    };

    let result = Converter::new(decoder, options.clone())
        .with_raw_params(raw.clone())
        .run(reader, source, output_kind, open_output);

    match result {
        Ok(summary) => Ok(summary),
        Err(e) => {
            if created.get() && !options.keep_partial {
                if let Err(remove_err) = std::fs::remove_file(output) {
                    warn!(output = %output.display(), "failed to remove partial output: {}", remove_err);
                }
            }
            Err(e)
        }
    }
}
