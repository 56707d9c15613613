// Output formatting for CLI

use crate::cli::{CliResult, OutputFormat};
use std::io::{self, Write};

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Output a stream description or summary
    pub fn output_value(&self, value: &serde_json::Value, writer: &mut impl Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(value)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(value, writer)?;
            }
            OutputFormat::Table => {
                self.output_table(value, writer)?;
            }
        }
        Ok(())
    }

    /// Output as key-value pairs, nested objects flattened to dotted keys
    fn output_key_value(&self, value: &serde_json::Value, writer: &mut impl Write) -> io::Result<()> {
        let mut items = Vec::new();
        flatten("", value, &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in items {
            writeln!(writer, "{}: {}", key, self.format_value(value))?;
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, value: &serde_json::Value, writer: &mut impl Write) -> io::Result<()> {
        let mut items = Vec::new();
        flatten("", value, &mut items);
        let max_key_len = items.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;

        for (key, value) in items {
            writeln!(
                writer,
                "{:<width$}: {}",
                format!("{}:", key),
                self.format_value(value),
                width = max_key_len + 2
            )?;
        }

        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(null)".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(arr) => {
                if arr.is_empty() {
                    "[]".to_string()
                } else {
                    format!("[{} items]", arr.len())
                }
            }
            serde_json::Value::Object(obj) => {
                if obj.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{{} items}}", obj.len())
                }
            }
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

fn flatten<'a>(prefix: &str, value: &'a serde_json::Value, out: &mut Vec<(String, &'a serde_json::Value)>) {
    match value.as_object() {
        Some(obj) if !obj.is_empty() => {
            for (key, child) in obj {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&key, child, out);
            }
        }
        _ => out.push((prefix.to_string(), value)),
    }
}

/// Progress indicator for batch operations
pub struct ProgressBar {
    total: usize,
    current: usize,
    show: bool,
    prefix: String,
}

impl ProgressBar {
    pub fn new(total: usize, show: bool) -> Self {
        Self {
            total,
            current: 0,
            show,
            prefix: String::new(),
        }
    }

    pub fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }

    pub fn increment(&mut self) {
        self.current += 1;
        if self.show && self.total > 0 {
            let percent = (self.current * 100) / self.total;
            print!("\r{} [{}/{}] ({}%)", self.prefix, self.current, self.total, percent);
            if self.current == self.total {
                println!();
            }
            io::stdout().flush().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(format: OutputFormat, value: &serde_json::Value) -> String {
        let mut out = Vec::new();
        OutputFormatter::new(format, true).output_value(value, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_key_value_flattens_nested_objects() {
        let value = json!({"header": {"sample_rate": 8000, "mode": "narrowband"}, "pages": 3});
        let text = render(OutputFormat::KeyValue, &value);
        assert_eq!(text, "header.mode: narrowband\nheader.sample_rate: 8000\npages: 3\n");
    }

    #[test]
    fn test_compact_json() {
        let value = json!({"pages": null});
        assert_eq!(render(OutputFormat::Json, &value), "{\"pages\":null}\n");
    }

    #[test]
    fn test_table_formats_arrays() {
        let value = json!({"comments": [["TITLE", "x"]]});
        let text = render(OutputFormat::Table, &value);
        assert!(text.contains("comments:"));
        assert!(text.contains("[1 items]"));
    }
}
