// Builders for synthetic Speex streams used across unit tests

use std::cell::RefCell;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::rc::Rc;

use crate::ogg::{crc, OGG_HEADER_TYPE_BOS};

/// In-memory `Write + Seek` sink that stays readable after its writer is gone
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Cursor<Vec<u8>>>>);

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().get_ref().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for SharedBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.borrow_mut().seek(pos)
    }
}

/// 80-byte Speex header with the given rate, mode, channels and frames per packet
pub fn speex_header_bytes(sample_rate: u32, mode: u32, channels: u32, frames: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 80];
    bytes[0..8].copy_from_slice(b"Speex   ");
    bytes[8..17].copy_from_slice(b"speex-1.2");
    bytes[28..32].copy_from_slice(&1u32.to_le_bytes());
    bytes[32..36].copy_from_slice(&80u32.to_le_bytes());
    bytes[36..40].copy_from_slice(&sample_rate.to_le_bytes());
    bytes[40..44].copy_from_slice(&mode.to_le_bytes());
    bytes[44..48].copy_from_slice(&4u32.to_le_bytes());
    bytes[48..52].copy_from_slice(&channels.to_le_bytes());
    bytes[52..56].copy_from_slice(&(-1i32).to_le_bytes());
    bytes[56..60].copy_from_slice(&160u32.to_le_bytes());
    bytes[64..68].copy_from_slice(&frames.to_le_bytes());
    bytes
}

/// Comment packet with a vendor string and `KEY=value` entries
pub fn comment_packet(vendor: &str, comments: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    bytes.extend_from_slice(vendor.as_bytes());
    bytes.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        bytes.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        bytes.extend_from_slice(comment.as_bytes());
    }
    bytes
}

/// One Ogg page holding each segment as its own packet, with a valid CRC
pub fn ogg_page<S: AsRef<[u8]>>(serial: u32, sequence: u32, segments: &[S]) -> Vec<u8> {
    let mut page = Vec::new();
    page.extend_from_slice(b"OggS");
    page.push(0);
    page.push(if sequence == 0 { OGG_HEADER_TYPE_BOS } else { 0 });
    page.extend_from_slice(&0u64.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&0u32.to_le_bytes());
    page.push(segments.len() as u8);
    for segment in segments {
        page.push(segment.as_ref().len() as u8);
    }
    for segment in segments {
        page.extend_from_slice(segment.as_ref());
    }
    let checksum = crc::checksum(&page);
    page[22..26].copy_from_slice(&checksum.to_le_bytes());
    page
}

/// Speex WAVE file: RIFF envelope, Speex fmt chunk, data chunk holding `data`
pub fn speex_wave(header: &[u8], extra_size: u16, block_align: u16, data: &[u8]) -> Vec<u8> {
    let sample_rate = u32::from_le_bytes([header[36], header[37], header[38], header[39]]);
    let channels = header[48] as u16;

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&0xA109u16.to_le_bytes());
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&0u32.to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&0u16.to_le_bytes());
    fmt.extend_from_slice(&extra_size.to_le_bytes());
    fmt.extend_from_slice(&0u16.to_le_bytes());
    fmt.extend_from_slice(header);

    let mut file = Vec::new();
    file.extend_from_slice(b"RIFF");
    file.extend_from_slice(&((4 + 8 + fmt.len() + 8 + data.len()) as u32).to_le_bytes());
    file.extend_from_slice(b"WAVE");
    file.extend_from_slice(b"fmt ");
    file.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
    file.extend_from_slice(&fmt);
    file.extend_from_slice(b"data");
    file.extend_from_slice(&(data.len() as u32).to_le_bytes());
    file.extend_from_slice(data);
    file
}
