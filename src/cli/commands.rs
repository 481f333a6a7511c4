// CLI command implementations
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{bail, Context};
use glob::glob;
use serde_json::Value;

use super::output::OutputFormatter;

/// Read metadata from files
pub fn command_read(
    files: &[String],
    forward_only: bool,
    output: Option<&str>,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let files = expand_patterns(files, formatter);
    if files.is_empty() {
        bail!("No files specified");
    }

    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    let mut failures = 0;
    for file_path in &files {
        match read_one(file_path, forward_only) {
            Ok(metadata) => {
                let mut value = serde_json::to_value(&metadata)?;
                if let Value::Object(obj) = &mut value {
                    obj.insert("path".to_string(), Value::String(file_path.clone()));
                }

                if !formatter.quiet() {
                    formatter.output_metadata(&value, &mut writer)?;
                }
            }
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                failures += 1;
            }
        }
    }

    writer.flush()?;

    if failures > 0 {
        bail!("{} of {} files could not be read", failures, files.len());
    }

    Ok(())
}

fn read_one(file_path: &str, forward_only: bool) -> anyhow::Result<id3meta::File> {
    if file_path == "-" {
        return id3meta::read(io::stdin().lock()).context("stdin");
    }

    let file = File::open(file_path).with_context(|| format!("File not found: {}", file_path))?;
    let reader = BufReader::new(file);

    let result = if forward_only {
        id3meta::read(reader)
    } else {
        id3meta::read_seekable(reader)
    };

    result.with_context(|| file_path.to_string())
}

/// Detect which tags each file carries
pub fn command_detect(files: &[String], formatter: &OutputFormatter) -> anyhow::Result<()> {
    let files = expand_patterns(files, formatter);
    if files.is_empty() {
        bail!("No files specified");
    }

    let mut failures = 0;
    for file_path in &files {
        match detect_one(file_path) {
            Ok((layout, Some(tag_len))) => {
                formatter.print_info(&format!(
                    "{}: {} (audio starts at byte {})",
                    file_path, layout, tag_len
                ));
            }
            Ok((layout, None)) => {
                formatter.print_info(&format!("{}: {}", file_path, layout));
            }
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} files could not be inspected", failures, files.len());
    }

    Ok(())
}

fn detect_one(file_path: &str) -> anyhow::Result<(id3meta::TagLayout, Option<u64>)> {
    let file = File::open(file_path).with_context(|| format!("File not found: {}", file_path))?;
    let mut reader = BufReader::new(file);

    let layout = id3meta::detect::detect(&mut reader).with_context(|| file_path.to_string())?;
    let tag_len = if layout.has_id3v2() {
        id3meta::detect::id3v2_len(&mut reader).with_context(|| file_path.to_string())?
    } else {
        None
    };

    Ok((layout, tag_len))
}

/// Expand glob patterns, leaving plain paths (and "-") untouched
fn expand_patterns(patterns: &[String], formatter: &OutputFormatter) -> Vec<String> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !pattern.contains(&['*', '?', '['][..]) {
            files.push(pattern.clone());
            continue;
        }

        let entries = match glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                formatter.print_error(&format!("Invalid glob pattern {}: {}", pattern, e));
                continue;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path.to_string_lossy().into_owned()),
                Ok(_) => {}
                Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
            }
        }
    }

    files
}
