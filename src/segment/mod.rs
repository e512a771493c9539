// Sentence segmentation: word-level (jieba) and character-level.

pub mod chars;
pub mod fragments;
pub mod jieba;
pub mod traits;
