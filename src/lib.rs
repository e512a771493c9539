// Inkstone: exploratory analysis of Chinese text
//
// This is the library root. Each module is one stage of the analysis:
// text → segment → frequency → embedding → cluster / projection → output.

pub mod cluster;
pub mod config;
pub mod embedding;
pub mod frequency;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod segment;
pub mod text;
