// spexdemux - Speex stream demultiplexer
//
// Reads Speex audio from Ogg pages, Speex WAVE files or headerless raw
// streams, drives a `FrameDecoder` packet by packet and writes the decoded
// PCM as a WAVE or raw file.

pub mod convert;
pub mod decoder;
pub mod error;
pub mod inspect;
pub mod loss;
pub mod ogg;
pub mod output;
pub mod speex;
pub mod utils;
pub mod wave;

#[cfg(test)]
mod testutil;

pub use convert::{
    convert_file, ConversionSummary, ConvertOptions, Converter, RawStreamParams, SourceKind,
};
pub use decoder::{FrameDecoder, SilenceDecoder};
pub use error::{Result, SpeexError};
pub use inspect::{inspect, inspect_file, StreamInfo};
pub use loss::LossSimulator;
pub use output::{ContainerWriter, OutputKind, PcmFormat, PcmWriter};
pub use speex::{SpeexMode, SpeexStreamHeader};
