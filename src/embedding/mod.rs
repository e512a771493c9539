// Skip-gram word embeddings: vocabulary, trainer, and the trained vectors.

pub mod model;
pub mod skipgram;
pub mod vocab;
