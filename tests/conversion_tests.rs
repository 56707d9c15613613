// File-level conversion tests: real files in, real files out

use hound::{SampleFormat, WavReader};
use std::fs;
use std::path::Path;

use spexdemux::ogg::crc;
use spexdemux::{
    convert_file, inspect_file, ConvertOptions, OutputKind, RawStreamParams, SilenceDecoder, SourceKind,
    SpeexError,
};

/// Narrowband frame of 16-bit mono PCM
const NB_FRAME_BYTES: usize = 160 * 2;

fn speex_header(sample_rate: u32, channels: u32, frames: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 80];
    bytes[0..8].copy_from_slice(b"Speex   ");
    bytes[8..17].copy_from_slice(b"speex-1.2");
    bytes[28..32].copy_from_slice(&1u32.to_le_bytes());
    bytes[32..36].copy_from_slice(&80u32.to_le_bytes());
    bytes[36..40].copy_from_slice(&sample_rate.to_le_bytes());
    bytes[44..48].copy_from_slice(&4u32.to_le_bytes());
    bytes[48..52].copy_from_slice(&channels.to_le_bytes());
    bytes[52..56].copy_from_slice(&(-1i32).to_le_bytes());
    bytes[56..60].copy_from_slice(&160u32.to_le_bytes());
    bytes[64..68].copy_from_slice(&frames.to_le_bytes());
    bytes
}

fn comment(vendor: &str) -> Vec<u8> {
    let mut bytes = (vendor.len() as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(vendor.as_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

fn page<P: AsRef<[u8]>>(sequence: u32, granule: u64, packets: &[P]) -> Vec<u8> {
    let mut page = b"OggS".to_vec();
    page.push(0);
    page.push(if sequence == 0 { 0x02 } else { 0 });
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&0x5EEDu32.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0; 4]);
    page.push(packets.len() as u8);
    page.extend(packets.iter().map(|p| p.as_ref().len() as u8));
    for packet in packets {
        page.extend_from_slice(packet.as_ref());
    }
    let checksum = crc::checksum(&page);
    page[22..26].copy_from_slice(&checksum.to_le_bytes());
    page
}

/// Header page, comment page, then one page per entry of `audio`
fn ogg_file(sample_rate: u32, channels: u32, frames: u32, audio: &[&[&str]]) -> Vec<u8> {
    let mut bytes = page(0, 0, &[&speex_header(sample_rate, channels, frames)]);
    bytes.extend(page(1, 0, &[&comment("spexdemux tests")]));
    for (i, packets) in audio.iter().enumerate() {
        bytes.extend(page(i as u32 + 2, 0, packets));
    }
    bytes
}

fn convert(input: &Path, output: &Path, kind: OutputKind, options: &ConvertOptions) -> spexdemux::Result<spexdemux::ConversionSummary> {
    let mut decoder = SilenceDecoder::new();
    convert_file(input, output, None, kind, &RawStreamParams::default(), options, &mut decoder)
}

#[test]
fn ogg_to_wave_writes_patched_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("call.spx");
    let output = dir.path().join("call.wav");
    fs::write(&input, ogg_file(8000, 1, 2, &[&["one", "two"], &["three"]])).unwrap();

    let summary = convert(&input, &output, OutputKind::Wave, &ConvertOptions::default()).unwrap();
    assert_eq!(summary.source, SourceKind::Ogg);
    assert_eq!(summary.packets_decoded, 3);
    assert_eq!(summary.pcm_bytes, (3 * 2 * NB_FRAME_BYTES) as u64);

    let mut reader = WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, SampleFormat::Int);
    assert_eq!(reader.len() as usize, 3 * 2 * NB_FRAME_BYTES / 2);
    assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
}

#[test]
fn truncated_final_page_ends_conversion_normally() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cut.spx");
    let output = dir.path().join("cut.raw");
    let mut bytes = ogg_file(8000, 1, 1, &[&["kept"], &["lost to truncation"]]);
    bytes.truncate(bytes.len() - 5);
    fs::write(&input, bytes).unwrap();

    let summary = convert(&input, &output, OutputKind::Raw, &ConvertOptions::default()).unwrap();
    assert_eq!(summary.packets_decoded, 1);
    assert_eq!(fs::metadata(&output).unwrap().len(), NB_FRAME_BYTES as u64);
}

#[test]
fn failed_conversion_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.spx");
    let output = dir.path().join("bad.wav");
    let mut bytes = ogg_file(8000, 1, 1, &[&["good"], &["corrupt"]]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0x40;
    fs::write(&input, bytes).unwrap();

    let err = convert(&input, &output, OutputKind::Wave, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, SpeexError::ChecksumMismatch { sequence: 3, .. }));
    assert!(!output.exists());
}

#[test]
fn keep_partial_leaves_finalized_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.spx");
    let output = dir.path().join("bad.wav");
    let mut bytes = ogg_file(8000, 1, 1, &[&["good"], &["corrupt"]]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0x40;
    fs::write(&input, bytes).unwrap();

    let options = ConvertOptions {
        keep_partial: true,
        ..Default::default()
    };
    assert!(convert(&input, &output, OutputKind::Wave, &options).is_err());

    let reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.len() as usize, NB_FRAME_BYTES / 2);
    assert_eq!(fs::metadata(&output).unwrap().len(), (44 + NB_FRAME_BYTES) as u64);
}

#[test]
fn raw_input_is_sniffed_and_split_by_cbr_size() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("call.bin");
    let output = dir.path().join("call.pcm");
    // Ten 38-byte narrowband quality 8 packets plus a partial one
    fs::write(&input, vec![0x1Eu8; 38 * 10 + 5]).unwrap();

    let summary = convert(&input, &output, OutputKind::Raw, &ConvertOptions::default()).unwrap();
    assert_eq!(summary.source, SourceKind::Raw);
    assert_eq!(summary.packets_decoded, 10);
    assert_eq!(fs::metadata(&output).unwrap().len(), (10 * NB_FRAME_BYTES) as u64);
}

#[test]
fn missing_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.wav");
    let err = convert(&dir.path().join("absent.spx"), &output, OutputKind::Wave, &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, SpeexError::Io(_)));
    assert!(!output.exists());
}

#[test]
fn inspect_reports_ogg_stream() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("call.spx");
    let mut bytes = ogg_file(8000, 1, 1, &[]);
    bytes.extend(page(2, 8000, &[b"a", b"b"]));
    fs::write(&input, bytes).unwrap();

    let info = inspect_file(&input, None, &RawStreamParams::default()).unwrap();
    assert_eq!(info.container, SourceKind::Ogg);
    assert_eq!(info.pages, Some(3));
    assert_eq!(info.duration_seconds, Some(1.0));
    assert_eq!(info.comment.unwrap().vendor_string, "spexdemux tests");
}
