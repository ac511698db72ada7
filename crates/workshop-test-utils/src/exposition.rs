//! Prometheus text exposition format checks.
//!
//! `parse_exposition` walks a `/metrics` body line by line and rejects
//! anything outside the text format grammar (version 0.0.4): comment lines
//! must be well-formed `# HELP` / `# TYPE` (other comments are allowed), and
//! every sample must be `name{label="value",...} value [timestamp]`.

use std::collections::BTreeMap;
use thiserror::Error;

const METRIC_TYPES: [&str; 5] = ["counter", "gauge", "histogram", "summary", "untyped"];

#[derive(Debug, Error)]
#[error("line {line}: {reason}: {text:?}")]
pub struct ExpositionError {
    pub line: usize,
    pub reason: String,
    pub text: String,
}

/// A single parsed sample line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

/// Parse a full exposition body into samples.
///
/// # Errors
///
/// Returns the first line that does not conform to the grammar.
pub fn parse_exposition(text: &str) -> Result<Vec<Sample>, ExpositionError> {
    let mut samples = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        let fail = |reason: &str| ExpositionError {
            line: index + 1,
            reason: reason.to_string(),
            text: raw.to_string(),
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            check_comment(comment).map_err(|reason| fail(&reason))?;
            continue;
        }

        samples.push(parse_sample(line).map_err(|reason| fail(&reason))?);
    }

    Ok(samples)
}

/// Value of the first sample named `name` whose labels include every pair in
/// `labels`.
pub fn sample_value(samples: &[Sample], name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    samples
        .iter()
        .find(|s| {
            s.name == name
                && labels
                    .iter()
                    .all(|(k, v)| s.labels.get(*k).map(String::as_str) == Some(*v))
        })
        .map(|s| s.value)
}

/// Sum of every sample named `name`, across all label sets.
pub fn sum_samples(samples: &[Sample], name: &str) -> f64 {
    samples
        .iter()
        .filter(|s| s.name == name)
        .map(|s| s.value)
        .sum()
}

fn check_comment(comment: &str) -> Result<(), String> {
    let mut parts = comment.trim_start().splitn(3, ' ');
    match parts.next() {
        Some("HELP") => {
            let name = parts.next().unwrap_or_default();
            if !is_metric_name(name) {
                return Err(format!("invalid metric name in HELP: {name:?}"));
            }
            Ok(())
        }
        Some("TYPE") => {
            let name = parts.next().unwrap_or_default();
            if !is_metric_name(name) {
                return Err(format!("invalid metric name in TYPE: {name:?}"));
            }
            let kind = parts.next().unwrap_or_default().trim();
            if !METRIC_TYPES.contains(&kind) {
                return Err(format!("unknown metric type {kind:?}"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_sample(line: &str) -> Result<Sample, String> {
    let name_end = line
        .find(|c: char| c == '{' || c == ' ' || c == '\t')
        .ok_or("sample has no value")?;
    let (name, mut rest) = line.split_at(name_end);
    if !is_metric_name(name) {
        return Err(format!("invalid metric name {name:?}"));
    }

    let mut labels = BTreeMap::new();
    if let Some(after_brace) = rest.strip_prefix('{') {
        rest = parse_labels(after_brace, &mut labels)?;
    }

    if !rest.starts_with([' ', '\t']) {
        return Err("missing whitespace before value".to_string());
    }

    let mut fields = rest.split_whitespace();
    let value = parse_value(fields.next().ok_or("missing value")?)?;
    if let Some(timestamp) = fields.next() {
        timestamp
            .parse::<i64>()
            .map_err(|_| format!("invalid timestamp {timestamp:?}"))?;
    }
    if fields.next().is_some() {
        return Err("trailing data after timestamp".to_string());
    }

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

/// Parse `a="b",c="d"}` and return the remainder after the closing brace.
fn parse_labels<'a>(
    mut rest: &'a str,
    labels: &mut BTreeMap<String, String>,
) -> Result<&'a str, String> {
    loop {
        if let Some(after) = rest.strip_prefix('}') {
            return Ok(after);
        }

        let eq = rest.find('=').ok_or("label without '='")?;
        let (label_name, after_name) = rest.split_at(eq);
        if !is_label_name(label_name) {
            return Err(format!("invalid label name {label_name:?}"));
        }

        let quoted = after_name
            .strip_prefix("=\"")
            .ok_or("label value must be quoted")?;

        let mut value = String::new();
        let mut chars = quoted.char_indices();
        let close = loop {
            match chars.next() {
                Some((_, '\\')) => match chars.next() {
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, '"')) => value.push('"'),
                    Some((_, 'n')) => value.push('\n'),
                    other => return Err(format!("invalid escape {other:?} in label value")),
                },
                Some((i, '"')) => break i,
                Some((_, '\n')) => return Err("raw newline in label value".to_string()),
                Some((_, c)) => value.push(c),
                None => return Err("unterminated label value".to_string()),
            }
        };

        if labels.insert(label_name.to_string(), value).is_some() {
            return Err(format!("duplicate label {label_name:?}"));
        }

        rest = &quoted[close + 1..];
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma;
        } else if !rest.starts_with('}') {
            return Err("expected ',' or '}' after label value".to_string());
        }
    }
}

fn parse_value(token: &str) -> Result<f64, String> {
    match token {
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ => token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid sample value {token:?}")),
    }
}

fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
