mod family;
mod parser;

pub use family::{sample_value, text_value, MetricFamily, MetricInstance, MetricType};
pub use parser::{parse, FamilyParser, ParseOptions, ValueMode};
