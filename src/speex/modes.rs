// Encoder frame-size tables for fixed-rate raw streams
//
// A raw Speex stream carries no header and no framing, so the packet size has to be
// derived from the quality the encoder ran at. The tables give bits per frame for each
// narrowband/sub-band submode and the submode each quality level selects.

use super::SpeexMode;

/// Bits per frame for each narrowband submode
const NB_FRAME_SIZE: [u32; 16] = [5, 43, 119, 160, 220, 300, 364, 492, 79, 1, 1, 1, 1, 1, 1, 1];

/// Bits per frame for each high-band submode
const SB_FRAME_SIZE: [u32; 5] = [4, 36, 112, 192, 352];

/// Narrowband submode selected by quality, narrowband encoder
const NB_QUALITY_MAP: [usize; 11] = [1, 8, 2, 3, 3, 4, 4, 5, 5, 6, 7];

/// Low-band submode selected by quality, sub-band encoder
const SB_NB_QUALITY_MAP: [usize; 11] = [1, 8, 2, 3, 4, 5, 5, 6, 6, 7, 7];

/// Wideband high-band submode selected by quality
const WB_QUALITY_MAP: [usize; 11] = [1, 1, 1, 1, 1, 1, 2, 2, 3, 3, 4];

/// Ultra-wideband high-band submode selected by quality
const UWB_QUALITY_MAP: [usize; 11] = [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1];

/// Highest encoder quality level
pub const MAX_QUALITY: u8 = 10;

/// Bytes per packet of a constant bit-rate stream at `quality` (clamped to 0..=10)
pub fn cbr_packet_bytes(mode: SpeexMode, quality: u8) -> u32 {
    let q = quality.min(MAX_QUALITY) as usize;
    let bits = match mode {
        SpeexMode::Narrowband => NB_FRAME_SIZE[NB_QUALITY_MAP[q]],
        SpeexMode::Wideband => {
            NB_FRAME_SIZE[SB_NB_QUALITY_MAP[q]] + SB_FRAME_SIZE[WB_QUALITY_MAP[q]]
        }
        SpeexMode::UltraWideband => {
            NB_FRAME_SIZE[SB_NB_QUALITY_MAP[q]]
                + SB_FRAME_SIZE[WB_QUALITY_MAP[q]]
                + SB_FRAME_SIZE[UWB_QUALITY_MAP[q]]
        }
    };
    (bits + 7) >> 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrowband_packet_sizes() {
        // 15 kbps at quality 8: 300 bits per 20 ms frame
        assert_eq!(cbr_packet_bytes(SpeexMode::Narrowband, 8), 38);
        assert_eq!(cbr_packet_bytes(SpeexMode::Narrowband, 0), 6);
        assert_eq!(cbr_packet_bytes(SpeexMode::Narrowband, 10), 62);
    }

    #[test]
    fn test_subband_packet_sizes() {
        assert_eq!(cbr_packet_bytes(SpeexMode::Wideband, 8), 70);
        assert_eq!(cbr_packet_bytes(SpeexMode::UltraWideband, 8), 74);
        assert_eq!(cbr_packet_bytes(SpeexMode::UltraWideband, 0), 11);
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(
            cbr_packet_bytes(SpeexMode::Wideband, 42),
            cbr_packet_bytes(SpeexMode::Wideband, MAX_QUALITY)
        );
    }
}
