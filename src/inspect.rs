// Header-only stream inspection
//
// Reads just enough of a file to describe it: the Speex header, the comment
// packet for Ogg, the declared data size for WAVE. Nothing is decoded.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::warn;

use crate::convert::{RawStreamParams, SourceKind};
use crate::error::{Result, SpeexError};
use crate::ogg::{OggPage, SpeexComment};
use crate::speex::SpeexStreamHeader;
use crate::wave::SpeexWaveHeader;

/// Description of a Speex stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub container: SourceKind,
    pub header: SpeexStreamHeader,
    /// Ogg comment packet, if present and readable
    pub comment: Option<SpeexComment>,
    /// Ogg pages read
    pub pages: Option<u64>,
    /// Bytes per packet for fixed-size framing
    pub packet_bytes: Option<u32>,
    /// Compressed audio bytes
    pub data_size: Option<u64>,
    pub duration_seconds: Option<f64>,
}

/// Inspect a Speex stream of known or sniffed container kind
pub fn inspect<R: BufRead>(
    mut reader: R,
    source: Option<SourceKind>,
    raw: &RawStreamParams,
) -> Result<StreamInfo> {
    let source = match source {
        Some(kind) => kind,
        None => SourceKind::detect(&mut reader)?,
    };
    match source {
        SourceKind::Ogg => inspect_ogg(&mut reader),
        SourceKind::Wave => inspect_wave(&mut reader),
        SourceKind::Raw => inspect_raw(&mut reader, raw),
    }
}

/// Inspect the file at `path`
pub fn inspect_file(path: &Path, source: Option<SourceKind>, raw: &RawStreamParams) -> Result<StreamInfo> {
    let reader = BufReader::new(File::open(path)?);
    inspect(reader, source, raw)
}

fn inspect_ogg<R: BufRead>(reader: &mut R) -> Result<StreamInfo> {
    let mut header = None;
    let mut comment = None;
    let mut pages = 0u64;
    let mut packets_after_header = 0u64;
    let mut last_granule = 0u64;

    while let Some(page) = OggPage::read(reader)? {
        if pages == 0 && !page.header.is_bos() {
            warn!("first Ogg page is not flagged as beginning of stream");
        }
        pages += 1;
        last_granule = page.header.granule_position;

        for segment in &page.segments {
            if header.is_none() {
                header = SpeexStreamHeader::parse(segment).ok();
                continue;
            }
            packets_after_header += 1;
            if packets_after_header == 1 {
                comment = match SpeexComment::parse(segment) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        warn!("unreadable comment packet: {}", e);
                        None
                    }
                };
            }
        }

        if page.header.is_eos() {
            break;
        }
    }

    let header = header.ok_or(SpeexError::MissingStreamHeader)?;
    let duration_seconds = (header.sample_rate > 0)
        .then(|| last_granule as f64 / header.sample_rate as f64);

    Ok(StreamInfo {
        container: SourceKind::Ogg,
        header,
        comment,
        pages: Some(pages),
        packet_bytes: None,
        data_size: None,
        duration_seconds,
    })
}

fn inspect_wave<R: BufRead>(reader: &mut R) -> Result<StreamInfo> {
    let wave = SpeexWaveHeader::read(reader)?;
    let block_align = wave.format.block_align as u32;
    let duration_seconds = fixed_rate_duration(&wave.format.header, block_align, wave.data_size as u64);

    Ok(StreamInfo {
        container: SourceKind::Wave,
        header: wave.format.header,
        comment: None,
        pages: None,
        packet_bytes: Some(block_align),
        data_size: Some(wave.data_size as u64),
        duration_seconds,
    })
}

fn inspect_raw<R: BufRead>(reader: &mut R, raw: &RawStreamParams) -> Result<StreamInfo> {
    let header = raw.header()?;
    let packet_bytes = raw.packet_bytes()?;
    let data_size = io::copy(reader, &mut io::sink())?;

    Ok(StreamInfo {
        container: SourceKind::Raw,
        duration_seconds: fixed_rate_duration(&header, packet_bytes, data_size),
        header,
        comment: None,
        pages: None,
        packet_bytes: Some(packet_bytes),
        data_size: Some(data_size),
    })
}

/// Duration of `data_size` bytes of fixed-size packets
fn fixed_rate_duration(header: &SpeexStreamHeader, packet_bytes: u32, data_size: u64) -> Option<f64> {
    if packet_bytes == 0 || header.sample_rate == 0 {
        return None;
    }
    let packets = data_size / packet_bytes as u64;
    let samples = packets * header.frames() as u64 * header.mode.frame_size() as u64;
    Some(samples as f64 / header.sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{comment_packet, ogg_page, speex_header_bytes, speex_wave};
    use std::io::Cursor;

    #[test]
    fn test_inspect_ogg_reads_comment_and_pages() {
        let mut bytes = ogg_page(3, 0, &[speex_header_bytes(8000, 0, 1, 1)]);
        bytes.extend(ogg_page(3, 1, &[comment_packet("Encoded with Speex", &["TITLE=Greeting"])]));
        bytes.extend(ogg_page(3, 2, &[b"audio".as_slice()]));

        let info = inspect(Cursor::new(bytes), None, &RawStreamParams::default()).unwrap();
        assert_eq!(info.container, SourceKind::Ogg);
        assert_eq!(info.header.sample_rate, 8000);
        assert_eq!(info.pages, Some(3));
        let comment = info.comment.unwrap();
        assert_eq!(comment.vendor_string, "Encoded with Speex");
        assert_eq!(comment.get("title").map(String::as_str), Some("Greeting"));
    }

    #[test]
    fn test_inspect_wave_duration() {
        // 50 narrowband packets of 38 bytes at 8 kHz: one second
        let header = speex_header_bytes(8000, 0, 1, 1);
        let data = vec![0u8; 38 * 50];
        let info = inspect(Cursor::new(speex_wave(&header, 82, 38, &data)), None, &RawStreamParams::default())
            .unwrap();
        assert_eq!(info.container, SourceKind::Wave);
        assert_eq!(info.packet_bytes, Some(38));
        assert_eq!(info.data_size, Some(1900));
        assert_eq!(info.duration_seconds, Some(1.0));
    }

    #[test]
    fn test_inspect_raw_uses_params() {
        let raw = RawStreamParams::default();
        let info = inspect(Cursor::new(vec![0x1Eu8; 38 * 100]), None, &raw).unwrap();
        assert_eq!(info.container, SourceKind::Raw);
        assert_eq!(info.duration_seconds, Some(2.0));
    }

    #[test]
    fn test_inspect_ogg_without_header() {
        let bytes = ogg_page(3, 0, &[b"nothing".as_slice()]);
        assert!(matches!(
            inspect(Cursor::new(bytes), Some(SourceKind::Ogg), &RawStreamParams::default()),
            Err(SpeexError::MissingStreamHeader)
        ));
    }
}
