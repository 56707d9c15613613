// Speex-in-WAVE container support
//
// WAVE File Structure:
// - RIFF header: "RIFF" (4 bytes), size (4 bytes), "WAVE" (4 bytes)
// - Chunks, each: id (4 bytes), size (4 bytes), payload (size bytes, padded to even)
//
// Speex "fmt " chunk payload:
// -  0 -  1: Format tag (0xA109)
// -  2 -  3: Channels
// -  4 -  7: Sample rate
// -  8 - 11: Average bytes per second
// - 12 - 13: Block align (bytes per packet)
// - 14 - 15: Bits per sample
// - 16 - 17: Extra size (>= 82)
// - 18 - 19: Reserved
// - 20 - 99: Speex header (80 bytes)
//
// Audio packets follow in the "data" chunk, each `block align` bytes long.

use std::io::{self, Read};
use tracing::debug;

use crate::error::{Result, SpeexError};
use crate::speex::{SpeexStreamHeader, SPEEX_HEADER_SIZE};
use crate::utils::{le_u16, le_u32, read_or_eof, ReadOutcome};

pub const RIFF_ID: &[u8; 4] = b"RIFF";
pub const WAVE_ID: &[u8; 4] = b"WAVE";
pub const FMT_ID: &[u8; 4] = b"fmt ";
pub const DATA_ID: &[u8; 4] = b"data";

/// WAVE format tag registered for Speex
pub const WAVE_FORMAT_SPEEX: u16 = 0xA109;

/// Smallest extra-size value of a Speex format chunk
const MIN_SPEEX_EXTRA_SIZE: u16 = 82;

/// Offset of the embedded Speex header inside the format chunk
const SPEEX_HEADER_OFFSET: usize = 20;

/// Format chunks beyond this size are not Speex format chunks
const MAX_FMT_SIZE: u32 = 0x1_0000;

/// WAVE chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl WaveChunkHeader {
    const HEADER_SIZE: usize = 8;

    /// Read a chunk header, `None` at end of input
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut buffer = [0u8; Self::HEADER_SIZE];
        if read_or_eof(reader, &mut buffer)? == ReadOutcome::Eof {
            return Ok(None);
        }
        Ok(Some(WaveChunkHeader {
            id: [buffer[0], buffer[1], buffer[2], buffer[3]],
            size: le_u32(&buffer, 4),
        }))
    }

    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).to_string()
    }
}

/// Speex format chunk contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeexWaveFormat {
    pub channels: u16,
    pub sample_rate: u32,
    /// Bytes per audio packet in the data chunk
    pub block_align: u16,
    pub extra_size: u16,
    pub header: SpeexStreamHeader,
}

impl SpeexWaveFormat {
    /// Parse a "fmt " chunk payload
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < 2 || le_u16(payload, 0) != WAVE_FORMAT_SPEEX {
            return Err(SpeexError::NotSpeexWave(format!(
                "format tag is not {:#06x}",
                WAVE_FORMAT_SPEEX
            )));
        }
        if payload.len() < SPEEX_HEADER_OFFSET {
            return Err(SpeexError::CorruptSpeexWave(format!(
                "format chunk is only {} bytes",
                payload.len()
            )));
        }

        let extra_size = le_u16(payload, 16);
        if extra_size < MIN_SPEEX_EXTRA_SIZE {
            return Err(SpeexError::CorruptSpeexWave(format!(
                "extra size {} is below {}",
                extra_size, MIN_SPEEX_EXTRA_SIZE
            )));
        }

        let header_end = SPEEX_HEADER_OFFSET + SPEEX_HEADER_SIZE;
        if payload.len() < header_end {
            return Err(SpeexError::CorruptSpeexWave(format!(
                "format chunk is only {} bytes, embedded header needs {}",
                payload.len(),
                header_end
            )));
        }

        Ok(SpeexWaveFormat {
            channels: le_u16(payload, 2),
            sample_rate: le_u32(payload, 4),
            block_align: le_u16(payload, 12),
            extra_size,
            header: SpeexStreamHeader::parse(&payload[SPEEX_HEADER_OFFSET..header_end])?,
        })
    }
}

/// Everything in a Speex WAVE file before the audio packets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeexWaveHeader {
    pub format: SpeexWaveFormat,
    /// Declared size of the data chunk
    pub data_size: u32,
}

impl SpeexWaveHeader {
    /// Walk the RIFF chunks up to and including the "data" chunk header
    ///
    /// The reader is left at the first byte of the data chunk payload.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut riff = [0u8; 12];
        if read_or_eof(reader, &mut riff)? == ReadOutcome::Eof {
            return Err(SpeexError::NotAWaveFile("file shorter than RIFF header".to_string()));
        }
        if &riff[0..4] != RIFF_ID {
            return Err(SpeexError::NotAWaveFile("missing RIFF tag".to_string()));
        }
        if &riff[8..12] != WAVE_ID {
            return Err(SpeexError::NotAWaveFile("missing WAVE tag".to_string()));
        }

        let mut format = None;
        loop {
            let chunk = WaveChunkHeader::read(reader)?.ok_or_else(|| {
                SpeexError::NotAWaveFile("no data chunk".to_string())
            })?;

            if &chunk.id == DATA_ID {
                let format = format.ok_or_else(|| {
                    SpeexError::NotSpeexWave("data chunk before fmt chunk".to_string())
                })?;
                return Ok(SpeexWaveHeader {
                    format,
                    data_size: chunk.size,
                });
            }

            if &chunk.id == FMT_ID {
                if chunk.size > MAX_FMT_SIZE {
                    return Err(SpeexError::CorruptSpeexWave(format!(
                        "format chunk of {} bytes",
                        chunk.size
                    )));
                }
                let mut payload = vec![0u8; chunk.size as usize];
                if read_or_eof(reader, &mut payload)? == ReadOutcome::Eof {
                    return Err(SpeexError::NotAWaveFile("truncated fmt chunk".to_string()));
                }
                format = Some(SpeexWaveFormat::parse(&payload)?);
            } else {
                debug!(chunk = %chunk.id_str(), size = chunk.size, "skipping WAVE chunk");
                let skipped = io::copy(&mut reader.by_ref().take(chunk.size as u64), &mut io::sink())?;
                if skipped < chunk.size as u64 {
                    return Err(SpeexError::NotAWaveFile(format!(
                        "truncated {} chunk",
                        chunk.id_str()
                    )));
                }
            }

            // RIFF chunks are word aligned
            if chunk.size % 2 == 1 {
                let mut pad = [0u8; 1];
                read_or_eof(reader, &mut pad)?;
            }
        }
    }
}
