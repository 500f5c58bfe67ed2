pub mod duration;
pub mod parse;

pub use duration::parse_duration;
