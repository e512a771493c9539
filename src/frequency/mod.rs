// Token counting and training-text assembly.

pub mod corpus;
pub mod table;
