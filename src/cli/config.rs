// CLI configuration
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use spexdemux::{ConvertOptions, OutputKind, RawStreamParams, SourceKind, SpeexMode};

/// spexdemux - Speex to PCM converter
#[derive(Parser, Debug)]
#[command(name = "spexdemux")]
#[command(about = "Demultiplex Ogg/WAVE/raw Speex streams into WAVE or raw PCM", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format for stream information
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (show stream details while converting)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for stream information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a Speex file to WAVE or raw PCM
    Convert {
        /// Speex input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// PCM output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Output container (defaults to the OUTPUT extension: .wav or raw)
        #[arg(short, long, value_enum)]
        to: Option<TargetArg>,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Show Speex stream information
    Info {
        /// Speex file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Show file size and modification time
        #[arg(short, long)]
        detailed: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Convert every matching file in a directory
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.spx")
        #[arg(short, long, default_value = "*.spx")]
        pattern: String,

        /// Directory for converted files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Output container
        #[arg(short, long, value_enum, default_value = "wav")]
        to: TargetArg,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}

/// Input container selection and raw stream parameters
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Input container
    #[arg(long, value_enum, default_value = "auto")]
    pub from: SourceArg,

    /// Raw input: encoder mode
    #[arg(long, value_enum, default_value = "nb")]
    pub mode: ModeArg,

    /// Raw input: sample rate in Hz
    #[arg(long, default_value_t = 8000)]
    pub rate: u32,

    /// Raw input: channel count
    #[arg(long, default_value_t = 1)]
    pub channels: u32,

    /// Raw input: frames per packet
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub frames: u32,

    /// Raw input: encoder quality (0-10)
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub quality: u8,

    /// Raw input: variable bit-rate stream
    #[arg(long)]
    pub vbr: bool,
}

impl SourceArgs {
    /// Container kind, `None` to sniff it from the file
    pub fn source(&self) -> Option<SourceKind> {
        match self.from {
            SourceArg::Auto => None,
            SourceArg::Ogg => Some(SourceKind::Ogg),
            SourceArg::Wav => Some(SourceKind::Wave),
            SourceArg::Raw => Some(SourceKind::Raw),
        }
    }

    pub fn raw_params(&self) -> RawStreamParams {
        RawStreamParams {
            mode: self.mode.into(),
            sample_rate: self.rate,
            channels: self.channels,
            frames_per_packet: self.frames,
            quality: self.quality,
            vbr: self.vbr,
        }
    }
}

/// Decoder and error-handling settings
#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Simulated packet loss percentage
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub loss: u8,

    /// Seed for the packet loss simulator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable perceptual enhancement
    #[arg(long)]
    pub no_enhance: bool,

    /// Fail if the first Ogg packet is not a Speex header
    #[arg(long)]
    pub strict: bool,

    /// Keep partially written output when conversion fails
    #[arg(long)]
    pub keep_partial: bool,
}

impl DecodeArgs {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            enhanced: !self.no_enhance,
            loss_percent: self.loss,
            seed: self.seed,
            strict_header: self.strict,
            keep_partial: self.keep_partial,
        }
    }
}

/// Input container argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Auto,
    Ogg,
    Wav,
    Raw,
}

/// Output container argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Wav,
    Raw,
}

impl From<TargetArg> for OutputKind {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Wav => OutputKind::Wave,
            TargetArg::Raw => OutputKind::Raw,
        }
    }
}

impl TargetArg {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetArg::Wav => "wav",
            TargetArg::Raw => "raw",
        }
    }
}

/// Speex mode argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Nb,
    Wb,
    Uwb,
}

impl From<ModeArg> for SpeexMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Nb => SpeexMode::Narrowband,
            ModeArg::Wb => SpeexMode::Wideband,
            ModeArg::Uwb => SpeexMode::UltraWideband,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_convert_arguments() {
        let config = Config::parse_from([
            "spexdemux", "convert", "in.raw", "out.wav", "--from", "raw", "--mode", "wb",
            "--quality", "5", "--loss", "10", "--seed", "3",
        ]);
        match config.command {
            Commands::Convert { input, output, to, source, decode } => {
                assert_eq!(input, PathBuf::from("in.raw"));
                assert_eq!(output, PathBuf::from("out.wav"));
                assert!(to.is_none());
                assert_eq!(source.source(), Some(SourceKind::Raw));
                let raw = source.raw_params();
                assert_eq!(raw.mode, SpeexMode::Wideband);
                assert_eq!(raw.quality, 5);
                let options = decode.options();
                assert_eq!(options.loss_percent, 10);
                assert_eq!(options.seed, Some(3));
                assert!(options.enhanced);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_loss_out_of_range_is_rejected() {
        let result = Config::try_parse_from(["spexdemux", "convert", "a.spx", "b.wav", "--loss", "101"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_frames_out_of_range_is_rejected() {
        for frames in ["0", "65"] {
            let result =
                Config::try_parse_from(["spexdemux", "convert", "a.spx", "b.wav", "--frames", frames]);
            assert!(result.is_err());
        }
        assert!(Config::try_parse_from(["spexdemux", "convert", "a.spx", "b.wav", "--frames", "64"]).is_ok());
    }
}
