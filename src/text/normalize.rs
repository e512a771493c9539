// Punctuation normalization and sentence splitting.
//
// Chinese text found in the wild mixes half-width and full-width punctuation.
// Before splitting, the two ASCII marks that show up most often inside
// sentences (comma and colon) are mapped to their full-width forms, then the
// paragraph is cut on the full-width period.

/// The canonical sentence terminator.
pub const SENTENCE_END: char = '。';

/// Half-width marks and their full-width replacements.
const REGULATE_TABLE: [(char, char); 2] = [(',', '，'), (':', '：')];

/// Replace ASCII comma and colon with their full-width forms.
///
/// Idempotent: the replacements never produce a character that is itself
/// replaced.
pub fn regulate(text: &str) -> String {
    text.chars()
        .map(|c| {
            REGULATE_TABLE
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// Append the sentence terminator unless the text already ends with it.
pub fn end_sentence(text: &str) -> String {
    if text.ends_with(SENTENCE_END) {
        text.to_string()
    } else {
        format!("{text}{SENTENCE_END}")
    }
}

/// Split a paragraph into sentences.
///
/// The paragraph is regulated, one trailing terminator is dropped, and the
/// rest is split on the terminator. Every fragment gets the terminator back,
/// so `"甲。乙。"` becomes `["甲。", "乙。"]` and every returned sentence ends
/// in [`SENTENCE_END`]. Consecutive terminators produce a bare `"。"`.
pub fn split_sentence(paragraph: &str) -> Vec<String> {
    let regulated = regulate(paragraph);
    let body = regulated
        .strip_suffix(SENTENCE_END)
        .unwrap_or(regulated.as_str());

    body.split(SENTENCE_END).map(end_sentence).collect()
}
