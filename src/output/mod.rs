// Output formatting: terminal display, SVG plot, and markdown report.

pub mod markdown;
pub mod plot;
pub mod terminal;

/// Cluster colours, cycled when there are more clusters than entries.
pub const CLUSTER_PALETTE: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// Colour for a cluster label.
pub fn cluster_color(label: usize) -> (u8, u8, u8) {
    CLUSTER_PALETTE[label % CLUSTER_PALETTE.len()]
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Display width of a string in terminal columns. CJK and full-width
/// characters take two columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

/// Pad `text` with spaces to `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115F}' |
        '\u{2E80}'..='\u{303E}' |
        '\u{3041}'..='\u{33FF}' |
        '\u{3400}'..='\u{4DBF}' |
        '\u{4E00}'..='\u{9FFF}' |
        '\u{A000}'..='\u{A4CF}' |
        '\u{AC00}'..='\u{D7A3}' |
        '\u{F900}'..='\u{FAFF}' |
        '\u{FE30}'..='\u{FE4F}' |
        '\u{FF00}'..='\u{FF60}' |
        '\u{FFE0}'..='\u{FFE6}'
    )
}
