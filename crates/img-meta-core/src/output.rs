//! Report rendering for the `data` (JSON) and `source` (TypeScript) formats.
//!
//! Both renderings are pure functions of the report and, for `source`, the
//! invocation arguments, so regenerating over an unchanged directory yields a
//! byte-identical file.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::types::AggregateReport;

/// `ImageMeta` declaration pasted verbatim into generated modules.
pub const IMAGE_META_TEMPLATE: &str = include_str!("templates/image_meta.ts");

/// Name of the generated string-literal union of image keys.
pub const SOURCE_TYPE_NAME: &str = "ImageSrc";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON object keyed by image path
    Data,
    /// TypeScript module with the mapping, record type and key union
    Source,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "data" | "json" => Some(Self::Data),
            "source" | "ts" | "typescript" => Some(Self::Source),
            _ => None,
        }
    }
}

/// Render a report in the given format.
///
/// `invocation` is the command line recorded in the `source` header; it is
/// ignored for `data`.
pub fn format_report(
    report: &AggregateReport,
    format: OutputFormat,
    invocation: &[String],
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Data => to_data(report),
        OutputFormat::Source => to_source(report, invocation),
    }
}

/// Pretty JSON (two-space indent) with a trailing newline.
pub fn to_data(report: &AggregateReport) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

/// A TypeScript module: warning header, the mapping as a literal, the
/// `ImageMeta` interface, then a union of every key.
pub fn to_source(
    report: &AggregateReport,
    invocation: &[String],
) -> Result<String, serde_json::Error> {
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "// This file was generated by img-meta. Do not edit.");
    let _ = writeln!(out, "// Command: {}", invocation.join(" "));
    out.push('\n');

    let _ = writeln!(
        out,
        "export const images: Record<{}, ImageMeta> = {};",
        SOURCE_TYPE_NAME,
        serde_json::to_string_pretty(report)?
    );
    out.push('\n');

    out.push_str(IMAGE_META_TEMPLATE);
    if !IMAGE_META_TEMPLATE.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');

    if report.is_empty() {
        let _ = writeln!(out, "export type {} = never;", SOURCE_TYPE_NAME);
    } else {
        let _ = writeln!(out, "export type {} =", SOURCE_TYPE_NAME);
        let last = report.len() - 1;
        for (i, key) in report.keys().enumerate() {
            let terminator = if i == last { ";" } else { "" };
            let _ = writeln!(out, "  | {}{}", serde_json::to_string(key)?, terminator);
        }
    }

    Ok(out)
}

/// Render a report and write it to `writer`, flushing afterwards.
pub fn write_report<W: Write>(
    mut writer: W,
    report: &AggregateReport,
    format: OutputFormat,
    invocation: &[String],
) -> io::Result<()> {
    let rendered = format_report(report, format, invocation).map_err(io::Error::other)?;
    writer.write_all(rendered.as_bytes())?;
    writer.flush()
}
