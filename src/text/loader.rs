// Document loading.
//
// The input is a plain UTF-8 file with one paragraph per line. Lines are
// decoded one at a time so a bad byte sequence can be reported with its line
// number instead of failing the whole file with an offset.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::normalize::split_sentence;
use super::Document;

/// Read a text file and split it into paragraphs of sentences.
pub fn load_document(path: &Path) -> Result<Document> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let document = parse_document(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!(
        path = %path.display(),
        paragraphs = document.len(),
        "Loaded document"
    );

    Ok(document)
}

/// Split raw bytes into paragraphs.
///
/// Both `\n` and `\r\n` terminators are stripped. Empty lines are skipped.
pub fn parse_document(bytes: &[u8]) -> Result<Document> {
    let mut document = Vec::new();

    for (i, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = std::str::from_utf8(raw)
            .with_context(|| format!("Line {} is not valid UTF-8", i + 1))?;

        if line.is_empty() {
            continue;
        }

        document.push(split_sentence(line));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_empty_lines() {
        let doc = parse_document("第一段。\r\n\r\n第二段,结束\n".as_bytes()).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc[0], vec!["第一段。"]);
        assert_eq!(doc[1], vec!["第二段，结束。"]);
    }

    #[test]
    fn test_parse_reports_bad_line() {
        let mut bytes = "好。\n".as_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let err = parse_document(&bytes).unwrap_err();
        assert!(err.to_string().contains("Line 2"), "got: {err}");
    }
}
