// Speex stream header support
//
// Speex Header Structure (80 bytes, little-endian):
// -  0 -  7: "Speex   " (8 bytes, space padded)
// -  8 - 27: Version string, e.g. "speex-1.2" (NUL padded)
// - 28 - 31: Version id
// - 32 - 35: Header size (80)
// - 36 - 39: Sample rate
// - 40 - 43: Mode: 0=narrowband, 1=wideband, 2=ultra-wideband
// - 44 - 47: Mode bitstream version
// - 48 - 51: Channels
// - 52 - 55: Bitrate (-1 if unknown)
// - 56 - 59: Frame size in samples
// - 60 - 63: VBR flag
// - 64 - 67: Frames per packet
// - 68 - 71: Extra headers
// - 72 - 79: Reserved
//
// The same blob is the first Ogg packet of a stream and is embedded at offset 20
// of the Speex WAVE `fmt ` chunk.

pub mod modes;

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SpeexError};
use crate::utils::encoding::decode_padded;
use crate::utils::le_u32;

pub use modes::cbr_packet_bytes;

/// Speex header magic
pub const SPEEX_SIGNATURE: &[u8; 8] = b"Speex   ";

/// Size of the Speex header packet
pub const SPEEX_HEADER_SIZE: usize = 80;

/// Largest accepted frames-per-packet value
pub const MAX_FRAMES_PER_PACKET: u32 = 64;

/// Speex encoder mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeexMode {
    Narrowband,
    Wideband,
    UltraWideband,
}

impl SpeexMode {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(SpeexMode::Narrowband),
            1 => Some(SpeexMode::Wideband),
            2 => Some(SpeexMode::UltraWideband),
            _ => None,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            SpeexMode::Narrowband => 0,
            SpeexMode::Wideband => 1,
            SpeexMode::UltraWideband => 2,
        }
    }

    /// Samples per channel in one decoded frame
    pub fn frame_size(&self) -> usize {
        match self {
            SpeexMode::Narrowband => 160,
            SpeexMode::Wideband => 320,
            SpeexMode::UltraWideband => 640,
        }
    }
}

impl fmt::Display for SpeexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeexMode::Narrowband => write!(f, "Narrowband"),
            SpeexMode::Wideband => write!(f, "Wideband"),
            SpeexMode::UltraWideband => write!(f, "UltraWideband"),
        }
    }
}

/// Parsed Speex stream header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeexStreamHeader {
    pub version: String,
    pub version_id: u32,
    pub header_size: u32,
    pub sample_rate: u32,
    pub mode: SpeexMode,
    pub bitstream_version: u32,
    pub channels: u32,
    pub bitrate: i32,
    pub frame_size: u32,
    pub vbr: bool,
    pub frames_per_packet: u32,
    pub extra_headers: u32,
}

impl SpeexStreamHeader {
    /// Parse an 80-byte Speex header packet
    pub fn parse(packet: &[u8]) -> Result<Self> {
        if packet.len() != SPEEX_HEADER_SIZE {
            return Err(SpeexError::MalformedHeader(format!(
                "expected {} bytes, got {}",
                SPEEX_HEADER_SIZE,
                packet.len()
            )));
        }

        if &packet[0..8] != SPEEX_SIGNATURE {
            return Err(SpeexError::MalformedHeader("missing \"Speex   \" tag".to_string()));
        }

        let mode_id = packet[40];
        let mode = SpeexMode::from_id(mode_id as u32).ok_or_else(|| {
            SpeexError::MalformedHeader(format!("unknown mode {}", mode_id))
        })?;

        let frames_per_packet = le_u32(packet, 64);
        if frames_per_packet > MAX_FRAMES_PER_PACKET {
            return Err(SpeexError::MalformedHeader(format!(
                "{} frames per packet exceeds {}",
                frames_per_packet, MAX_FRAMES_PER_PACKET
            )));
        }

        Ok(SpeexStreamHeader {
            version: decode_padded(&packet[8..28]),
            version_id: le_u32(packet, 28),
            header_size: le_u32(packet, 32),
            sample_rate: le_u32(packet, 36),
            mode,
            bitstream_version: le_u32(packet, 44),
            channels: le_u32(packet, 48),
            bitrate: le_u32(packet, 52) as i32,
            frame_size: le_u32(packet, 56),
            vbr: le_u32(packet, 60) != 0,
            frames_per_packet,
            extra_headers: le_u32(packet, 68),
        })
    }

    /// Sub-frames per packet, never less than one
    pub fn frames(&self) -> u32 {
        self.frames_per_packet.max(1)
    }
}
