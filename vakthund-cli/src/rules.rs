//! ## vakthund-cli::rules
//! **Minimal Snort-style rule literal extractor.**
//!
//! The rule parser proper is an out-of-scope collaborator (spec §1): it is
//! expected to hand the core a well-formed [`SignatureSet`], already
//! stripped of `content:"..."` hex escapes and rule semantics beyond
//! literal matching. This module is that stand-in, just thorough enough to
//! drive the CLI end to end from a real-looking rules file: each
//! non-comment, non-blank line is either
//!
//! - a Snort-style rule containing one or more `content:"...";` fields
//!   (the first one wins, matching how the benchmarked source only ever
//!   indexed a rule's first content literal) and an optional `nocase;`
//!   modifier, with `msg:"..."` and `sid:N` captured as metadata; or
//! - a plain `literal,nocase` fallback line (`nocase` is `true`/`false`),
//!   for rule sets with no Snort framing at all.
//!
//! Hex escapes (`|4d 5a|`) are decoded since the parser is explicitly
//! responsible for that (spec §1); any other hex-decode failure is treated
//! as a malformed rule and skipped, mirroring "the core sees a filtered
//! set" (spec §7).

use vakthund_detection::{DetectionError, SignatureMeta, SignatureSet};

#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

pub fn load_rules(path: &str) -> Result<SignatureSet, RuleLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
        path: path.to_string(),
        source,
    })?;

    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(entry) = parse_line(line) {
            entries.push(entry);
        }
    }

    Ok(SignatureSet::build(entries)?)
}

fn parse_line(line: &str) -> Option<(Vec<u8>, bool, Option<SignatureMeta>)> {
    if line.contains("content:") {
        parse_snort_rule(line)
    } else {
        parse_plain_line(line)
    }
}

/// Extracts the first `content:"..."` literal, a `nocase;` modifier, and
/// `msg`/`sid` metadata from one Snort-style rule line.
fn parse_snort_rule(line: &str) -> Option<(Vec<u8>, bool, Option<SignatureMeta>)> {
    let content = extract_quoted_field(line, "content:")?;
    let pattern = decode_content(&content)?;
    let nocase = line.contains("nocase;") || line.ends_with("nocase");
    let message = extract_quoted_field(line, "msg:");
    let rule_id = extract_field(line, "sid:").and_then(|v| v.trim_end_matches(';').parse().ok());

    let meta = if message.is_some() || rule_id.is_some() {
        Some(SignatureMeta {
            message,
            rule_id,
        })
    } else {
        None
    };

    Some((pattern, nocase, meta))
}

fn parse_plain_line(line: &str) -> Option<(Vec<u8>, bool, Option<SignatureMeta>)> {
    let (literal, nocase) = match line.rsplit_once(',') {
        Some((literal, flag)) => (literal, flag.trim().eq_ignore_ascii_case("true")),
        None => (line, false),
    };
    if literal.is_empty() {
        return None;
    }
    Some((literal.as_bytes().to_vec(), nocase, None))
}

/// Finds `key"..."` and returns the text between the quotes.
fn extract_quoted_field(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let open = rest.find('"')?;
    let after_open = &rest[open + 1..];
    let close = after_open.find('"')?;
    Some(after_open[..close].to_string())
}

/// Finds `key<value>` up to the next `;` or end of line (unquoted field).
fn extract_field(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Decodes a Snort `content` literal: `|4d 5a|`-style hex runs interleaved
/// with literal text, e.g. `USER |00|anonymous`.
fn decode_content(raw: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '|' {
            let mut hex = String::new();
            for c in chars.by_ref() {
                if c == '|' {
                    break;
                }
                hex.push(c);
            }
            for byte_str in hex.split_whitespace() {
                let byte = u8::from_str_radix(byte_str, 16).ok()?;
                out.push(byte);
            }
        } else {
            out.push(c as u8);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
