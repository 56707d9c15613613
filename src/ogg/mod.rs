// OGG Speex container support
//
// OGG File Structure:
// - OGG Page Header (27 bytes)
//   - Capture Pattern: "OggS" (4 bytes)
//   - Version: 0 (1 byte)
//   - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
//   - Granule Position (8 bytes)
//   - Bitstream Serial Number (4 bytes)
//   - Page Sequence Number (4 bytes)
//   - CRC Checksum (4 bytes)
//   - Number of Page Segments (1 byte)
//   - Segment Table (variable)
//
// Speex Structure:
// 1. Speex header packet (80 bytes, first packet)
// 2. Comment packet (vendor string + user comments, second packet)
// 3. Audio packets, one per segment

pub mod comment;
pub mod crc;
pub mod page;

pub use comment::SpeexComment;
pub use page::{OggPage, OggPageHeader};

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

/// Fixed part of an OGG page header
pub const OGG_HEADER_SIZE: usize = 27;

// OGG page header types
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
