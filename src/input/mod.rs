mod line;
mod source;

pub use line::{DelimReader, LineReader, Lines};
pub use source::Source;
