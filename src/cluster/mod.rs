// Clustering of word vectors.
//
// Spectral clustering builds an RBF similarity graph over the vectors, embeds
// the nodes with the leading eigenvectors of its normalized Laplacian, and
// runs k-means in that space. The eigen solver is shared with the PCA
// initialisation of the t-SNE projection.

pub mod eigen;
pub mod kmeans;
pub mod spectral;
