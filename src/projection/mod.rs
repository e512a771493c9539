// 2-D projection of word vectors for plotting.

pub mod scaler;
pub mod tsne;
