// Encoding utilities

use encoding_rs::UTF_8;

/// Decode UTF-8 text, replacing invalid sequences
pub fn decode_text(data: &[u8]) -> String {
    UTF_8.decode(data).0.to_string()
}

/// Decode a fixed-width, NUL or space padded string field
pub fn decode_padded(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    decode_text(&data[..end]).trim_end().to_string()
}
