use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::model::{LabelName, LabelValue, SampleValue};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MetricType {
    Gauge,
    Counter,
    Summary,
    Histogram,
}

impl MetricType {
    /// Case-insensitive. `None` for anything that isn't one of the four
    /// supported types.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gauge" => Some(MetricType::Gauge),
            "counter" => Some(MetricType::Counter),
            "summary" => Some(MetricType::Summary),
            "histogram" => Some(MetricType::Histogram),
            _ => None,
        }
    }
}

// [
//   {
//     "name": "go_gc_duration_seconds",
//     "help": "A summary of the pause duration of garbage collection cycles.",
//     "type": "SUMMARY",
//     "metrics": [
//       {
//         "quantiles": {"0": "4.3739e-05", "0.5": "0.000103558", "1": "0.004940157"},
//         "count": "2600367",
//         "sum": "377.264188367"
//       }
//     ]
//   }
// ]
#[derive(Debug, Default, Deserialize)]
pub struct MetricFamily {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub help: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub metrics: Option<Vec<MetricInstance>>,
}

impl MetricFamily {
    pub fn metric_type(&self) -> Option<MetricType> {
        MetricType::parse(&self.kind)
    }

    /// `"metrics": null` and a missing `metrics` both mean no instances.
    pub fn instances(&self) -> &[MetricInstance] {
        self.metrics.as_deref().unwrap_or(&[])
    }
}

/// Type of a not yet decoded family. Only the `type` field is looked at,
/// so families of unsupported types never have to fit `MetricFamily`.
pub fn peek_type(family: &Value) -> Option<MetricType> {
    family
        .get("type")
        .and_then(Value::as_str)
        .and_then(MetricType::parse)
}

/// Object maps keep the document key order (`serde_json/preserve_order`).
#[derive(Debug, Default, Deserialize)]
pub struct MetricInstance {
    pub labels: Option<Map<String, Value>>,
    pub value: Option<Value>,
    pub quantiles: Option<Map<String, Value>>,
    pub buckets: Option<Map<String, Value>>,
    pub count: Option<Value>,
    pub sum: Option<Value>,
}

impl MetricInstance {
    pub fn labels(&self) -> Result<Vec<(LabelName, LabelValue)>> {
        match &self.labels {
            Some(labels) => string_pairs(labels, "label"),
            None => Ok(vec![]),
        }
    }

    pub fn quantiles(&self) -> Result<Option<Vec<(LabelValue, SampleValue)>>> {
        self.quantiles
            .as_ref()
            .map(|q| number_pairs(q, "quantile"))
            .transpose()
    }

    pub fn buckets(&self) -> Result<Vec<(LabelValue, SampleValue)>> {
        match &self.buckets {
            Some(buckets) => number_pairs(buckets, "bucket"),
            None => Ok(vec![]),
        }
    }

    pub fn value(&self) -> Result<SampleValue> {
        sample_value(self.value.as_ref(), "value")
    }

    pub fn count(&self) -> Result<SampleValue> {
        sample_value(self.count.as_ref(), "count")
    }

    pub fn sum(&self) -> Result<SampleValue> {
        sample_value(self.sum.as_ref(), "sum")
    }
}

/// Textual form of a scalar JSON value. Nested arrays and objects have none.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.to_string()),
        _ => None,
    }
}

/// Numbers come either as JSON numbers or as their exposition text
/// (`"5.85e+12"`, `"+Inf"`, `"NaN"`).
pub fn sample_value(value: Option<&Value>, field: &str) -> Result<SampleValue> {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| Error::decode(format!("{} {} is out of range", field, n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<SampleValue>()
            .map_err(|e| Error::from((format!("invalid {} '{}'", field, s), e)))
            .map_err(|e| e.with_kind(ErrorKind::Decode)),
        Some(other) => Err(Error::decode(format!(
            "{} must be a number or a numeric string, got {}",
            field, other
        ))),
        None => Err(Error::decode(format!("missing {}", field))),
    }
}

fn string_pairs(map: &Map<String, Value>, what: &str) -> Result<Vec<(String, String)>> {
    map.iter()
        .map(|(k, v)| {
            if k.is_empty() {
                return Err(Error::decode(format!("empty {} name", what)));
            }
            match text_value(v) {
                Some(v) => Ok((k.clone(), v)),
                None => Err(Error::decode(format!(
                    "{} '{}' must have a scalar value",
                    what, k
                ))),
            }
        })
        .collect()
}

fn number_pairs(map: &Map<String, Value>, what: &str) -> Result<Vec<(String, SampleValue)>> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), sample_value(Some(v), what)?)))
        .collect()
}
