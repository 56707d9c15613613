// I/O utilities for reading Speex containers
//
// All container integers are little-endian regardless of host byte order.

use std::io::{ErrorKind, Read};

/// Little-endian 16-bit integer at `offset`
///
/// The caller guarantees `buf` holds at least `offset + 2` bytes.
pub fn le_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Little-endian 32-bit integer at `offset`
///
/// The caller guarantees `buf` holds at least `offset + 4` bytes.
pub fn le_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Read little-endian 32-bit integer
pub fn read_le_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

/// Result of a fill attempt against a byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The buffer was filled completely
    Filled,
    /// The source ended before the buffer was full
    Eof,
}

/// Fill `buf` from `reader`, reporting a short source as `ReadOutcome::Eof`
///
/// Bytes read before the end of input are left in `buf` but are not meaningful.
/// Any I/O error other than an interrupted read is propagated.
pub fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<ReadOutcome> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(ReadOutcome::Eof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(ReadOutcome::Filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_le_integers_ignore_host_order() {
        let buf = [0xAA, 0x09, 0xA1, 0x40, 0x1F, 0x00, 0x00];
        assert_eq!(le_u16(&buf, 1), 0xA109);
        assert_eq!(le_u32(&buf, 3), 8000);
    }

    #[test]
    fn test_read_or_eof_full_and_short() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let mut buf = [0u8; 4];
        assert_eq!(read_or_eof(&mut cursor, &mut buf).unwrap(), ReadOutcome::Filled);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(read_or_eof(&mut cursor, &mut buf).unwrap(), ReadOutcome::Eof);
        assert_eq!(read_or_eof(&mut cursor, &mut buf).unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn test_read_or_eof_empty_buffer_is_filled() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert_eq!(read_or_eof(&mut cursor, &mut []).unwrap(), ReadOutcome::Filled);
    }
}
