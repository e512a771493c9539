// Unit tests for segmentation.
//
// Divider splitting and the character segmenter are pure and checked
// exactly. Jieba output depends on its bundled dictionary, so those tests
// assert properties (length filter, no dividers, mode differences) rather
// than exact token lists, except for a few unambiguous words.

use inkstone::segment::chars::{is_punctuation, CharSegmenter};
use inkstone::segment::fragments::{split_fragments, DIVIDERS};
use inkstone::segment::jieba::{JiebaSegmenter, SegmentMode, MIN_WORD_CHARS};
use inkstone::segment::traits::Segmenter;

// ============================================================
// Divider fragments
// ============================================================

#[test]
fn fragments_without_dividers_is_whole_sentence() {
    assert_eq!(split_fragments("没有分隔符"), vec!["没有分隔符"]);
}

#[test]
fn fragments_empty_sentence() {
    assert!(split_fragments("").is_empty());
}

#[test]
fn fragments_ascii_semicolon_and_quote_are_dividers() {
    assert_eq!(split_fragments("a;b\"c"), vec!["a", "b", "c"]);
}

#[test]
fn every_divider_is_punctuation() {
    assert!(DIVIDERS.iter().all(|&c| is_punctuation(c)));
}

// ============================================================
// CharSegmenter
// ============================================================

#[test]
fn chars_keep_latin_and_digits() {
    assert_eq!(CharSegmenter.segment("AI很好2"), vec!["A", "I", "很", "好", "2"]);
}

#[test]
fn chars_skip_full_width_space() {
    assert_eq!(CharSegmenter.segment("你\u{3000}好"), vec!["你", "好"]);
}

#[test]
fn chars_only_punctuation_gives_nothing() {
    assert!(CharSegmenter.segment("，。、“”（）！？").is_empty());
}

// ============================================================
// JiebaSegmenter
// ============================================================

#[test]
fn jieba_finds_common_words() {
    let tokens = JiebaSegmenter::default().segment("我爱北京天安门。");
    assert!(tokens.contains(&"北京".to_string()), "got {tokens:?}");
    assert!(tokens.contains(&"天安门".to_string()), "got {tokens:?}");
    assert!(!tokens.contains(&"我".to_string()));
}

#[test]
fn jieba_never_crosses_dividers() {
    let tokens = JiebaSegmenter::default().segment("中华、人民（共和国）");
    for token in &tokens {
        assert!(
            !token.chars().any(|c| DIVIDERS.contains(&c)),
            "token {token} contains a divider"
        );
    }
}

#[test]
fn jieba_tokens_meet_minimum_length_in_every_mode() {
    let sentence = "小明硕士毕业于中国科学院计算所，后在日本京都大学深造。";
    for mode in [SegmentMode::Precise, SegmentMode::Search, SegmentMode::Full] {
        let tokens = JiebaSegmenter::new(mode, true).segment(sentence);
        assert!(!tokens.is_empty(), "{mode:?} produced nothing");
        assert!(tokens
            .iter()
            .all(|t| t.chars().count() >= MIN_WORD_CHARS && !t.contains(' ')));
    }
}

#[test]
fn jieba_search_mode_yields_at_least_precise_tokens() {
    let sentence = "中国科学院计算技术研究所";
    let precise = JiebaSegmenter::new(SegmentMode::Precise, true).segment(sentence);
    let search = JiebaSegmenter::new(SegmentMode::Search, true).segment(sentence);
    assert!(search.len() >= precise.len());
}

#[test]
fn jieba_empty_and_punctuation_only() {
    let segmenter = JiebaSegmenter::default();
    assert!(segmenter.segment("").is_empty());
    assert!(segmenter.segment("。").is_empty());
}

#[test]
fn jieba_user_dict_missing_file_is_error() {
    let path = std::env::temp_dir().join("inkstone_no_such_dict.txt");
    let result = JiebaSegmenter::default().with_user_dict(&path);
    assert!(result.is_err());
}

#[test]
fn jieba_user_dict_adds_words() {
    let path = std::env::temp_dir().join(format!("inkstone_dict_{}.txt", std::process::id()));
    std::fs::write(&path, "砚台墨池 100000 n\n").unwrap();

    let segmenter = JiebaSegmenter::default().with_user_dict(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let tokens = segmenter.segment("他有一方砚台墨池。");
    assert!(tokens.contains(&"砚台墨池".to_string()), "got {tokens:?}");
    assert_eq!(segmenter.mode(), SegmentMode::Precise);
}
