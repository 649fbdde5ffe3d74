//! Custom packets are stored as whitespace-separated hex bytes:
//!
//! ```text
//! # dst-mac (6)        src-mac (6)         ethertype (2)
//! ff ff ff ff ff ff    02 00 00 00 00 01   88 b5
//! 0x42 00,01 // tokens may carry a 0x prefix or trailing punctuation
//! 000102030405 // or be runs of several bytes
//! ```

use crate::types::hex_pair;
use thiserror::Error;

/// Starter file written when no custom packet exists yet.
pub const TEMPLATE: &str = "# Custom Ethernet frame bytes (no FCS)\n\
# Format: hex bytes separated by spaces/newlines. Comments with # or //.\n\
# dst-mac (6)   src-mac (6)   ethertype (2)   payload (...)\n\
ff ff ff ff ff ff   02 00 00 00 00 01   88 b5\n\
42 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00\n";

const BYTES_PER_LINE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexFileError {
    #[error("line {line}: `{token}` is not hex")]
    BadToken { line: usize, token: String },
    #[error("line {line}: `{token}` has an odd number of hex digits")]
    OddLength { line: usize, token: String },
    #[error("no bytes found")]
    Empty,
}

/// Parses a hex packet file. Line numbers in errors are 1-based.
pub fn parse(content: &str) -> Result<Vec<u8>, HexFileError> {
    let mut bytes = Vec::new();

    for (index, line) in content.lines().enumerate() {
        for raw in strip_comment(line).split_whitespace() {
            let token = strip_prefix(raw).trim_matches(|c: char| c.is_ascii_punctuation());
            if token.is_empty() {
                continue;
            }
            if !token.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(HexFileError::BadToken {
                    line: index + 1,
                    token: raw.to_string(),
                });
            }
            if token.len() % 2 != 0 {
                return Err(HexFileError::OddLength {
                    line: index + 1,
                    token: raw.to_string(),
                });
            }
            for pair in token.as_bytes().chunks(2) {
                // Both digits were validated above.
                if let Some(byte) = hex_pair(pair[0], pair[1]) {
                    bytes.push(byte);
                }
            }
        }
    }

    if bytes.is_empty() {
        return Err(HexFileError::Empty);
    }
    Ok(bytes)
}

/// Renders `bytes` in the format `parse` reads, `comments` first as `#` lines.
pub fn render(bytes: &[u8], comments: &[&str]) -> String {
    let mut out = String::new();
    for comment in comments {
        out.push_str("# ");
        out.push_str(comment);
        out.push('\n');
    }
    for line in bytes.chunks(BYTES_PER_LINE) {
        out.push_str(&hex_dump(line, line.len()));
        out.push('\n');
    }
    out
}

/// Space-separated lowercase hex, cut after `max_bytes` with a count of what was left out.
pub fn hex_dump(bytes: &[u8], max_bytes: usize) -> String {
    let shown = bytes.len().min(max_bytes);
    let mut out = bytes[..shown]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    if shown < bytes.len() {
        out.push_str(&format!(" ... ({} more bytes)", bytes.len() - shown));
    }
    out
}

fn strip_comment(line: &str) -> &str {
    let cut = [line.find('#'), line.find("//")]
        .iter()
        .filter_map(|pos| *pos)
        .min();
    match cut {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn strip_prefix(token: &str) -> &str {
    if token.starts_with("0x") || token.starts_with("0X") {
        &token[2..]
    } else {
        token
    }
}
