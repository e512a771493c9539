// Character-level segmentation.
//
// The character variant of the analysis treats every Chinese character as a
// token. Whitespace and punctuation are skipped; everything else (including
// Latin letters and digits) counts.

use super::fragments::is_divider;
use super::traits::Segmenter;

/// Segmenter yielding one token per non-punctuation character.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSegmenter;

impl Segmenter for CharSegmenter {
    fn segment(&self, sentence: &str) -> Vec<String> {
        sentence
            .chars()
            .filter(|&c| !c.is_whitespace() && !is_punctuation(c))
            .map(String::from)
            .collect()
    }
}

/// Punctuation in ASCII, general punctuation, CJK symbols, and full-width forms.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || is_divider(c)
        || matches!(c,
            '\u{2010}'..='\u{2027}' |   // dashes, quotes, ellipsis
            '\u{2030}'..='\u{205E}' |   // per mille, primes, misc marks
            '\u{3000}'..='\u{303F}' |   // CJK symbols and punctuation
            '\u{FE10}'..='\u{FE1F}' |   // vertical forms
            '\u{FE30}'..='\u{FE4F}' |   // CJK compatibility forms
            '\u{FF01}'..='\u{FF0F}' |   // full-width ！＂＃…／
            '\u{FF1A}'..='\u{FF20}' |   // full-width ：；＜＝＞？＠
            '\u{FF3B}'..='\u{FF40}' |   // full-width ［＼］＾＿｀
            '\u{FF5B}'..='\u{FF65}'     // full-width ｛｜｝～ and half-width CJK marks
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_skip_punctuation() {
        let tokens = CharSegmenter.segment("你好，世界！ 再见。");
        assert_eq!(tokens, vec!["你", "好", "世", "界", "再", "见"]);
    }

    #[test]
    fn test_chars_keep_repeats() {
        assert_eq!(CharSegmenter.segment("好好"), vec!["好", "好"]);
    }

    #[test]
    fn test_punctuation_classes() {
        assert!(is_punctuation('：'));
        assert!(is_punctuation('…'));
        assert!(is_punctuation('《'));
        assert!(!is_punctuation('中'));
        assert!(!is_punctuation('７'));
    }
}
