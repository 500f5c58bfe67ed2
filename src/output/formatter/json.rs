use serde::ser::{Serialize, SerializeMap, Serializer};

use super::formatter::{special_value, Formatter};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{LabelSet, Sample, Timestamp};

// {"labels":{"__name__":"x","instance":"i","job":"j"},"timestamp":1609455605000,"value":1.0}
#[derive(serde::Serialize)]
struct SampleRepr<'a> {
    labels: LabelsRepr<'a>,
    timestamp: Timestamp,
    value: ValueRepr,
}

struct LabelsRepr<'a>(&'a LabelSet);

impl<'a> Serialize for LabelsRepr<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for label in self.0 {
            map.serialize_entry(label.name(), label.value())?;
        }
        map.end()
    }
}

// JSON has no NaN or infinities.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum ValueRepr {
    Number(f64),
    Special(&'static str),
}

pub struct JsonFormatter {}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, sample: &Sample) -> Result<Vec<u8>> {
        let value = match special_value(sample.value()) {
            Some(v) => ValueRepr::Special(v),
            None => ValueRepr::Number(sample.value()),
        };

        let repr = SampleRepr {
            labels: LabelsRepr(sample.labels()),
            timestamp: sample.timestamp(),
            value,
        };

        serde_json::to_vec(&repr)
            .map_err(|e| Error::from(("JSON serialization failed", e)).with_kind(ErrorKind::Sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() -> Result<()> {
        let formatter = JsonFormatter::new();

        let labels = LabelSet::base("x", "i", "j").with("quantile", "0.5");
        let sample = Sample::new(labels, 1609455605000, 10.0);
        assert_eq!(
            String::from_utf8_lossy(&formatter.format(&sample)?),
            r#"{"labels":{"__name__":"x","instance":"i","job":"j","quantile":"0.5"},"timestamp":1609455605000,"value":10.0}"#
        );

        let sample = Sample::new(LabelSet::base("x", "i", "j"), 0, f64::INFINITY);
        assert_eq!(
            String::from_utf8_lossy(&formatter.format(&sample)?),
            r#"{"labels":{"__name__":"x","instance":"i","job":"j"},"timestamp":0,"value":"+Inf"}"#
        );
        Ok(())
    }
}
