use super::labels::{LabelSet, LabelValue};
use super::timestamp::Timestamp;
use super::SampleValue;

/// One point of one time series, ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    labels: LabelSet,
    timestamp: Timestamp,
    value: SampleValue,
}

impl Sample {
    pub fn new(labels: LabelSet, timestamp: Timestamp, value: SampleValue) -> Self {
        Self {
            labels,
            timestamp,
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> SampleValue {
        self.value
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn name(&self) -> Option<&LabelValue> {
        self.labels.name()
    }

    pub fn label(&self, name: &str) -> Option<&LabelValue> {
        self.labels.get(name)
    }
}
