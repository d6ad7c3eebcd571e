//! Small text and file system helpers shared across the pipeline.
//!
//! - ASCII transliteration for gazetteer keys and geocoder queries
//! - Fixed-width line wrapping for narrow display layouts
//! - Log-friendly truncation
//! - Output directory validation

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Transliterate to plain ASCII. Accents are stripped and non-Latin scripts
/// are romanized, so a Japanese or Greek dateline still yields a usable
/// geocoder query.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(ascii_fold("São Paulo"), "Sao Paulo");
/// assert_eq!(ascii_fold("Zürich"), "Zurich");
/// assert_eq!(ascii_fold("Αθήνα"), "Athena");
/// ```
pub fn ascii_fold(s: &str) -> String {
    deunicode::deunicode(s).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap text into lines of at most `width` characters.
///
/// Breaks on whitespace where possible; words longer than `width` (including
/// unspaced CJK runs) are split hard. Existing line breaks are treated as
/// whitespace, so paragraphs collapse into one flowing block.
pub fn wrap_columns(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + chars.len() <= width {
            current.push(' ');
            current.extend(chars.iter());
            current_len += 1 + chars.len();
            continue;
        }

        if current_len > 0 {
            // Fill the remainder of the line with the head of an oversized word.
            if chars.len() > width && current_len + 1 < width {
                let room = width - current_len - 1;
                current.push(' ');
                current.extend(chars.drain(..room));
            }
            lines.push(std::mem::take(&mut current));
        }

        while chars.len() > width {
            lines.push(chars.drain(..width).collect());
        }
        current_len = chars.len();
        current.extend(chars);
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a character boundary at or below `max` bytes with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
