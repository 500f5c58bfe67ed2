use super::formatter::{special_value, Formatter};
use crate::error::Result;
use crate::model::Sample;

/// Exposition-like text: `{__name__="x", instance="i", job="j"} 1 1609455605000`.
pub struct TextFormatter {}

impl TextFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TextFormatter {
    fn format(&self, sample: &Sample) -> Result<Vec<u8>> {
        let labels: Vec<String> = sample
            .labels()
            .iter()
            .map(|l| format!("{}=\"{}\"", l.name(), escape(l.value())))
            .collect();

        let value = match special_value(sample.value()) {
            Some(v) => v.to_string(),
            None => sample.value().to_string(),
        };

        Ok(format!("{{{}}} {} {}", labels.join(", "), value, sample.timestamp()).into_bytes())
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
