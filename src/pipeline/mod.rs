// Analysis pipelines that chain the embedding, clustering and projection
// stages.

pub mod word_map;
