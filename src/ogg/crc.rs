// Ogg page checksum
//
// CRC-32 with polynomial 0x04C11DB7, MSB first, initial value 0 and no final xor.
// The page's own checksum field is zeroed while the CRC is computed.

const CRC_POLYNOMIAL: u32 = 0x04C1_1DB7;

const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            r = if r & 0x8000_0000 != 0 {
                (r << 1) ^ CRC_POLYNOMIAL
            } else {
                r << 1
            };
            bit += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

/// Continue a running Ogg CRC over `data`
pub fn update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ CRC_TABLE[(((crc >> 24) as u8) ^ byte) as usize]
    })
}

/// Ogg CRC of a complete buffer
pub fn checksum(data: &[u8]) -> u32 {
    update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // CRC-32/POSIX check value 0x765E7680 before its final inversion
        assert_eq!(checksum(b"123456789"), !0x765E_7680);
    }

    #[test]
    fn test_incremental_matches_whole() {
        let data = b"OggS\0\x02 some page bytes";
        let split = update(update(0, &data[..7]), &data[7..]);
        assert_eq!(split, checksum(data));
    }
}
