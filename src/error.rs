// Error types for spexdemux
//
// Every variant except `Io` is a terminal condition for a conversion. End of input
// is not represented here: readers report it through `ReadOutcome::Eof`.

use thiserror::Error;

/// Errors raised while demultiplexing or converting a Speex stream
#[derive(Error, Debug)]
pub enum SpeexError {
    /// Speex header has the wrong length, magic tag or mode
    #[error("Malformed Speex header: {0}")]
    MalformedHeader(String),

    /// Ogg page CRC does not match the stored checksum
    #[error("Ogg checksum mismatch on page {sequence}: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        sequence: u32,
        stored: u32,
        computed: u32,
    },

    /// Segment of 255 bytes (continued packet) found in an Ogg page
    #[error("Unsupported Ogg segment length 255 in segment {segment} of page {sequence}")]
    UnsupportedSegmentLength { sequence: u32, segment: usize },

    /// Ogg page does not start with "OggS"
    #[error("Missing Ogg capture pattern")]
    MissingCapturePattern,

    /// RIFF/WAVE envelope is missing
    #[error("Not a WAVE file: {0}")]
    NotAWaveFile(String),

    /// WAVE file does not carry a Speex format chunk
    #[error("Not a Speex WAVE file: {0}")]
    NotSpeexWave(String),

    /// Speex format chunk is present but unusable
    #[error("Possibly corrupt Speex WAVE file: {0}")]
    CorruptSpeexWave(String),

    /// Input ended before a valid Speex header was seen
    #[error("No Speex header found in stream")]
    MissingStreamHeader,

    /// Frame decoder rejected the stream parameters
    #[error("Decoder initialization failed (mode {mode}, {sample_rate} Hz, {channels} channel(s))")]
    DecoderInitFailed {
        mode: u32,
        sample_rate: u32,
        channels: u32,
    },

    /// Raw VBR streams have no fixed packet size
    #[error("Variable bit-rate raw Speex streams are not supported")]
    UnsupportedVbr,

    /// Loss percentage outside 0..=100
    #[error("Invalid loss percentage: {0} (expected 0-100)")]
    InvalidLossPercent(u8),

    /// Error reported by the frame decoder while decoding a packet
    #[error("Decode error: {0}")]
    Decode(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type
pub type Result<T> = std::result::Result<T, SpeexError>;
