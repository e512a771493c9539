// Text loading and sentence splitting.

pub mod loader;
pub mod normalize;

/// One paragraph of the input: its sentences, each ending in the full-width
/// period.
pub type Paragraph = Vec<String>;

/// A whole input file: one paragraph per non-empty line.
pub type Document = Vec<Paragraph>;
