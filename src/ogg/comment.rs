// Speex comment packet
//
// Second packet of an Ogg Speex stream, laid out like a Vorbis comment without the
// packet-type prefix. It is only inspected for stream information; the decoder never
// sees it.

use std::io::{Cursor, Read};

use crate::utils::encoding::decode_text;
use crate::utils::io::read_le_u32;

/// Speex comment structure
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SpeexComment {
    pub vendor_string: String,
    pub comments: Vec<(String, String)>,
}

impl SpeexComment {
    /// Parse a comment packet
    pub fn parse(packet: &[u8]) -> std::io::Result<Self> {
        let mut reader = Cursor::new(packet);

        let vendor_string = read_string(&mut reader, packet.len())?;

        let comment_count = read_le_u32(&mut reader)? as usize;
        let mut comments = Vec::new();
        for _ in 0..comment_count {
            let comment_string = read_string(&mut reader, packet.len())?;

            // Parse comment (format: FIELD=value)
            if let Some((field, value)) = comment_string.split_once('=') {
                comments.push((field.to_string(), value.to_string()));
            }
        }

        Ok(SpeexComment {
            vendor_string,
            comments,
        })
    }

    /// Get a comment value by field name
    pub fn get(&self, field: &str) -> Option<&String> {
        self.comments
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(_, v)| v)
    }
}

/// Length-prefixed string, bounded by the packet size
fn read_string<R: Read>(reader: &mut R, limit: usize) -> std::io::Result<String> {
    let length = read_le_u32(reader)? as usize;
    if length > limit {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("comment length {} exceeds packet size {}", length, limit),
        ));
    }
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes)?;
    Ok(decode_text(&bytes))
}
