mod formatter;
mod json;
mod text;

pub use formatter::Formatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;
