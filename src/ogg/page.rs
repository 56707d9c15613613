use std::io::Read;

use crate::error::{Result, SpeexError};
use crate::ogg::{crc, OGG_HEADER_SIZE, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_EOS, OGG_SIGNATURE};
use crate::utils::{le_u32, read_or_eof, ReadOutcome};

/// Lacing value that continues a packet into the next segment
const CONTINUED_SEGMENT: u8 = 255;

/// OGG Page Header
#[derive(Debug, Clone)]
pub struct OggPageHeader {
    pub version: u8,
    pub header_type: u8,
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

/// OGG Page
///
/// Every segment is shorter than 255 bytes, so each one is a complete packet.
#[derive(Debug, Clone)]
pub struct OggPage {
    pub header: OggPageHeader,
    pub segments: Vec<Vec<u8>>,
}

impl OggPageHeader {
    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    /// Check if this is the end of a stream
    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }

    /// Calculate total page data size from segment table
    pub fn data_size(&self) -> usize {
        self.segment_table.iter().map(|&x| x as usize).sum()
    }
}

impl OggPage {
    /// Read and verify one OGG page
    ///
    /// Returns `Ok(None)` when the input ends anywhere inside the page. A page is only
    /// returned once its CRC has been verified over header, segment table and payload.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut header = [0u8; OGG_HEADER_SIZE];
        if read_or_eof(reader, &mut header)? == ReadOutcome::Eof {
            return Ok(None);
        }

        if &header[0..4] != OGG_SIGNATURE {
            return Err(SpeexError::MissingCapturePattern);
        }

        let stored_crc = le_u32(&header, 22);
        header[22..26].fill(0);
        let mut running_crc = crc::update(0, &header);

        let page_sequence = le_u32(&header, 18);

        // Read segment table
        let mut segment_table = vec![0u8; header[26] as usize];
        if read_or_eof(reader, &mut segment_table)? == ReadOutcome::Eof {
            return Ok(None);
        }
        running_crc = crc::update(running_crc, &segment_table);

        if let Some(segment) = segment_table.iter().position(|&len| len == CONTINUED_SEGMENT) {
            return Err(SpeexError::UnsupportedSegmentLength {
                sequence: page_sequence,
                segment,
            });
        }

        let mut segments = Vec::with_capacity(segment_table.len());
        for &len in &segment_table {
            let mut segment = vec![0u8; len as usize];
            if read_or_eof(reader, &mut segment)? == ReadOutcome::Eof {
                return Ok(None);
            }
            running_crc = crc::update(running_crc, &segment);
            segments.push(segment);
        }

        if running_crc != stored_crc {
            return Err(SpeexError::ChecksumMismatch {
                sequence: page_sequence,
                stored: stored_crc,
                computed: running_crc,
            });
        }

        Ok(Some(OggPage {
            header: OggPageHeader {
                version: header[4],
                header_type: header[5],
                granule_position: u64::from_le_bytes([
                    header[6], header[7], header[8], header[9],
                    header[10], header[11], header[12], header[13],
                ]),
                bitstream_serial: le_u32(&header, 14),
                page_sequence,
                crc: stored_crc,
                segment_table,
            },
            segments,
        }))
    }
}
