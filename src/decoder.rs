// Frame decoder capability
//
// The demuxer never looks inside a Speex packet. It hands packets to a
// `FrameDecoder`, tells it how many sub-frames to pull out of each one and
// which of them to conceal, and collects whatever PCM the decoder produced.

use crate::error::{Result, SpeexError};
use crate::speex::SpeexMode;

/// Bytes per decoded 16-bit sample
const BYTES_PER_SAMPLE: usize = 2;

/// Speex frame decoder
///
/// Calls arrive in this order for every audio packet:
/// 1. `decode(Some(packet), false)` for the first sub-frame, or
///    `decode(None, true)` when the packet was lost
/// 2. `decode(None, lost)` for each remaining sub-frame, continuing from the bits
///    already loaded (or concealing, when the packet was lost)
/// 3. `drain` until it returns 0
pub trait FrameDecoder {
    /// Configure the decoder for a stream, `false` if the parameters are unsupported
    fn init(&mut self, mode: SpeexMode, sample_rate: u32, channels: u32, enhanced: bool) -> bool;

    /// Decode one sub-frame
    fn decode(&mut self, payload: Option<&[u8]>, concealment: bool) -> Result<()>;

    /// Move pending decoded PCM into `out`, returning the byte count (0 if none)
    fn drain(&mut self, out: &mut [u8]) -> usize;
}

/// Decoder that emits silence of the right length for every frame
///
/// Used to run the container pipeline without a synthesis engine, e.g. to
/// validate a file or measure its duration.
#[derive(Debug, Default)]
pub struct SilenceDecoder {
    frame_bytes: usize,
    pending: usize,
    frames_decoded: u64,
    frames_concealed: u64,
    initialized: bool,
}

impl SilenceDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames decoded since `init`, concealed ones included
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Frames decoded in concealment mode since `init`
    pub fn frames_concealed(&self) -> u64 {
        self.frames_concealed
    }
}

impl FrameDecoder for SilenceDecoder {
    fn init(&mut self, mode: SpeexMode, sample_rate: u32, channels: u32, _enhanced: bool) -> bool {
        if sample_rate == 0 || !(1..=2).contains(&channels) {
            return false;
        }
        self.frame_bytes = mode.frame_size() * channels as usize * BYTES_PER_SAMPLE;
        self.pending = 0;
        self.frames_decoded = 0;
        self.frames_concealed = 0;
        self.initialized = true;
        true
    }

    fn decode(&mut self, _payload: Option<&[u8]>, concealment: bool) -> Result<()> {
        if !self.initialized {
            return Err(SpeexError::Decode("decoder not initialized".to_string()));
        }
        self.pending += self.frame_bytes;
        self.frames_decoded += 1;
        if concealment {
            self.frames_concealed += 1;
        }
        Ok(())
    }

    fn drain(&mut self, out: &mut [u8]) -> usize {
        let n = self.pending.min(out.len());
        out[..n].fill(0);
        self.pending -= n;
        n
    }
}
