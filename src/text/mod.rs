pub mod normalize;
pub mod passages;
pub mod segment;

pub use normalize::{expand, normalize};
pub use passages::{PassageSource, TextSource};
