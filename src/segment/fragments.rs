// Divider splitting applied before word segmentation.
//
// Enumeration commas, brackets, quotes and clause marks never belong inside a
// word, so a sentence is cut on them first and each piece is segmented on its
// own. That keeps the segmenter from gluing words across a quote boundary.

use std::sync::OnceLock;

use regex_lite::Regex;

/// The ten marks a sentence is cut on before segmentation.
pub const DIVIDERS: [char; 10] = ['、', '（', '）', '，', '。', '；', ';', '“', '”', '"'];

static DIVIDER_RE: OnceLock<Regex> = OnceLock::new();

fn divider_regex() -> &'static Regex {
    DIVIDER_RE.get_or_init(|| {
        let class: String = DIVIDERS.iter().map(|c| regex_lite::escape(&c.to_string())).collect();
        Regex::new(&format!("[{class}]")).expect("divider class is a valid regex")
    })
}

/// Whether a character is one of the divider marks.
pub fn is_divider(c: char) -> bool {
    DIVIDERS.contains(&c)
}

/// Split a sentence on the divider marks, dropping empty pieces.
pub fn split_fragments(sentence: &str) -> Vec<&str> {
    divider_regex()
        .split(sentence)
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_every_divider() {
        let pieces = split_fragments("甲、乙（丙）丁，戊。己；庚;辛“壬”癸\"子");
        assert_eq!(
            pieces,
            vec!["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸", "子"]
        );
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert_eq!(split_fragments("“你好”。"), vec!["你好"]);
        assert!(split_fragments("，。").is_empty());
    }

    #[test]
    fn test_is_divider() {
        assert!(is_divider('，'));
        assert!(!is_divider('：'));
    }
}
