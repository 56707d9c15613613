// CLI command implementations
use anyhow::{bail, Context};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use spexdemux::{convert_file, inspect_file, ConversionSummary, OutputKind, SilenceDecoder};

use crate::cli::config::{DecodeArgs, SourceArgs, TargetArg};
use crate::cli::output::{OutputFormatter, ProgressBar};
use crate::cli::CliResult;

/// Convert one Speex file
pub fn command_convert(
    input: &Path,
    output: &Path,
    to: Option<TargetArg>,
    source: &SourceArgs,
    decode: &DecodeArgs,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let output_kind = match to {
        Some(target) => target.into(),
        None => OutputKind::from_path(output),
    };

    let mut decoder = SilenceDecoder::new();
    let summary = convert_one(input, output, output_kind, source, decode, &mut decoder)?;
    formatter.print_success(&format!(
        "{} -> {} ({})",
        input.display(),
        output.display(),
        describe(&summary)
    ));
    if summary.packets_lost > 0 {
        formatter.print_info(&format!(
            "{} of {} packets concealed ({} of {} frames)",
            summary.packets_lost,
            summary.packets_decoded,
            decoder.frames_concealed(),
            decoder.frames_decoded()
        ));
    }
    Ok(())
}

/// Show stream information for each file
pub fn command_info(
    files: &[PathBuf],
    detailed: bool,
    source: &SourceArgs,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    if files.is_empty() {
        bail!("No files specified");
    }

    let raw = source.raw_params();
    let mut stdout = io::stdout().lock();
    let mut failures = 0usize;

    for path in files {
        if !path.exists() {
            formatter.print_error(&format!("File not found: {}", path.display()));
            failures += 1;
            continue;
        }

        let stream = match inspect_file(path, source.source(), &raw) {
            Ok(stream) => stream,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                failures += 1;
                continue;
            }
        };

        let mut value = serde_json::to_value(&stream)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("file".to_string(), path.display().to_string().into());
            if detailed {
                let metadata = std::fs::metadata(path)
                    .with_context(|| format!("Failed to stat {}", path.display()))?;
                obj.insert("file_size".to_string(), metadata.len().into());
                if let Some(modified) = metadata.modified().ok().map(chrono::DateTime::<chrono::Utc>::from) {
                    obj.insert(
                        "modified".to_string(),
                        modified.format("%Y-%m-%d %H:%M:%S UTC").to_string().into(),
                    );
                }
            }
        }
        formatter.output_value(&value, &mut stdout)?;
    }

    if failures > 0 {
        bail!("{} of {} files could not be read", failures, files.len());
    }
    Ok(())
}

/// Convert every file in `directory` matching `pattern` into `output_dir`
pub fn command_batch(
    directory: &str,
    pattern: &str,
    output_dir: &Path,
    to: TargetArg,
    source: &SourceArgs,
    decode: &DecodeArgs,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    use glob::glob;

    let show_progress = !formatter.is_quiet();

    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in glob(&glob_pattern).with_context(|| format!("Invalid glob pattern: {}", glob_pattern))? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    let total = files.len();
    if total == 0 {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    if show_progress {
        formatter.print_info(&format!("Converting {} files...", total));
    }

    let mut progress = ProgressBar::new(total, show_progress);
    progress.set_prefix("Converting".to_string());
    let mut success_count = 0;
    let mut error_count = 0;
    let mut decoder = SilenceDecoder::new();

    for input in &files {
        let output = batch_output_path(input, output_dir, to);
        match convert_one(input, &output, to.into(), source, decode, &mut decoder) {
            Ok(summary) => {
                debug!(
                    input = %input.display(),
                    output = %output.display(),
                    frames = decoder.frames_decoded(),
                    concealed = decoder.frames_concealed(),
                    "{}",
                    describe(&summary)
                );
                success_count += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                error_count += 1;
            }
        }
        progress.increment();
    }

    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count, error_count
    ));

    if error_count > 0 {
        bail!("{} of {} files failed to convert", error_count, total);
    }
    Ok(())
}

fn convert_one(
    input: &Path,
    output: &Path,
    output_kind: OutputKind,
    source: &SourceArgs,
    decode: &DecodeArgs,
    decoder: &mut SilenceDecoder,
) -> CliResult<ConversionSummary> {
    convert_file(
        input,
        output,
        source.source(),
        output_kind,
        &source.raw_params(),
        &decode.options(),
        decoder,
    )
    .with_context(|| format!("Failed to convert {}", input.display()))
}

/// `<output_dir>/<input stem>.<ext>`
fn batch_output_path(input: &Path, output_dir: &Path, to: TargetArg) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| input.as_os_str());
    output_dir.join(stem).with_extension(to.extension())
}

fn describe(summary: &ConversionSummary) -> String {
    format!(
        "{}, {} Hz, {} ch, {} packets, {} PCM bytes",
        summary.source,
        summary.header.sample_rate,
        summary.header.channels,
        summary.packets_decoded,
        summary.pcm_bytes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::{ModeArg, SourceArg};

    fn raw_source() -> SourceArgs {
        SourceArgs {
            from: SourceArg::Raw,
            mode: ModeArg::Nb,
            rate: 8000,
            channels: 1,
            frames: 2,
            quality: 8,
            vbr: false,
        }
    }

    fn decode_args(loss: u8) -> DecodeArgs {
        DecodeArgs {
            loss,
            seed: Some(7),
            no_enhance: false,
            strict: false,
            keep_partial: false,
        }
    }

    #[test]
    fn test_convert_one_counts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("call.spx");
        let output = dir.path().join("call.wav");
        std::fs::write(&input, vec![0x5Au8; 38 * 3]).unwrap();

        let mut decoder = SilenceDecoder::new();
        let summary =
            convert_one(&input, &output, OutputKind::Wave, &raw_source(), &decode_args(0), &mut decoder)
                .unwrap();
        assert_eq!(summary.packets_decoded, 3);
        assert_eq!(decoder.frames_decoded(), 6);
        assert_eq!(decoder.frames_concealed(), 0);

        let summary =
            convert_one(&input, &output, OutputKind::Wave, &raw_source(), &decode_args(100), &mut decoder)
                .unwrap();
        assert_eq!(summary.packets_lost, 3);
        assert_eq!(decoder.frames_decoded(), 6);
        assert_eq!(decoder.frames_concealed(), 6);
    }

    #[test]
    fn test_batch_output_path_replaces_extension() {
        let path = batch_output_path(Path::new("in/call.spx"), Path::new("out"), TargetArg::Wav);
        assert_eq!(path, PathBuf::from("out/call.wav"));
        let path = batch_output_path(Path::new("in/call"), Path::new("out"), TargetArg::Raw);
        assert_eq!(path, PathBuf::from("out/call.raw"));
    }
}
