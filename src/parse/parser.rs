use log::{debug, warn};

use serde_json::Value;

use super::family::{peek_type, MetricFamily, MetricInstance, MetricType};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{LabelSet, Sample, Timestamp, BUCKET_LABEL, QUANTILE_LABEL};

/// Where gauge and counter samples take their value from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValueMode {
    /// Every instance of a family reports the value of `metrics[0]`.
    FirstInstance,
    /// Every instance reports its own value.
    PerInstance,
}

impl Default for ValueMode {
    fn default() -> Self {
        ValueMode::FirstInstance
    }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub instance: String,
    pub job: String,
    pub value_mode: ValueMode,
}

impl ParseOptions {
    pub fn new<I, J>(instance: I, job: J) -> Self
    where
        I: Into<String>,
        J: Into<String>,
    {
        Self {
            instance: instance.into(),
            job: job.into(),
            value_mode: ValueMode::default(),
        }
    }

    pub fn with_value_mode(mut self, value_mode: ValueMode) -> Self {
        self.value_mode = value_mode;
        self
    }
}

/// Flattens metric families into individual samples.
///
/// Gauges and counters give one sample per instance. Summaries give one
/// sample per quantile plus `<name>_sum` and `<name>_count`. Histograms
/// give one `<name>_bucket` sample per bucket plus `<name>_sum` and
/// `<name>_count` for every instance. Families of any other type are
/// ignored.
pub struct FamilyParser {
    opts: ParseOptions,
}

impl FamilyParser {
    pub fn new(opts: ParseOptions) -> Self {
        Self { opts }
    }

    /// Decodes one input line (a JSON array of families) and flattens it.
    /// Families of unsupported types are dropped before they are decoded,
    /// whatever their shape.
    pub fn parse_line(&self, line: &[u8], timestamp: Timestamp) -> Result<Vec<Sample>> {
        let raw: Vec<Value> = serde_json::from_slice(line)
            .map_err(|e| Error::from(("JSON decoding failed", e)).with_kind(ErrorKind::Decode))?;

        let mut families = Vec::with_capacity(raw.len());
        for family in raw {
            if peek_type(&family).is_none() {
                debug!(
                    "skipping family '{}' of unsupported type {}",
                    family.get("name").and_then(Value::as_str).unwrap_or_default(),
                    family.get("type").unwrap_or(&Value::Null)
                );
                continue;
            }
            let family: MetricFamily = serde_json::from_value(family).map_err(|e| {
                Error::from(("JSON decoding failed", e)).with_kind(ErrorKind::Decode)
            })?;
            families.push(family);
        }

        self.parse_families(&families, timestamp)
    }

    pub fn parse_families(
        &self,
        families: &[MetricFamily],
        timestamp: Timestamp,
    ) -> Result<Vec<Sample>> {
        let mut samples = vec![];
        for family in families {
            samples.extend(self.parse_family(family, timestamp)?);
        }
        Ok(samples)
    }

    pub fn parse_family(&self, family: &MetricFamily, timestamp: Timestamp) -> Result<Vec<Sample>> {
        let metric_type = match family.metric_type() {
            Some(t) => t,
            None => {
                debug!(
                    "skipping family '{}' of unsupported type '{}'",
                    family.name, family.kind
                );
                return Ok(vec![]);
            }
        };

        if family.name.is_empty() {
            return Err(Error::decode(format!(
                "{:?} family without a name",
                metric_type
            )));
        }

        let samples = match metric_type {
            MetricType::Gauge | MetricType::Counter => self.parse_scalar(family, timestamp),
            MetricType::Summary => self.parse_summary(family, timestamp),
            MetricType::Histogram => self.parse_histogram(family, timestamp),
        };

        samples.map_err(|e| Error::decode(format!("family '{}': {}", family.name, e)))
    }

    fn parse_scalar(&self, family: &MetricFamily, timestamp: Timestamp) -> Result<Vec<Sample>> {
        let shared_value = match (self.opts.value_mode, family.instances().first()) {
            (ValueMode::FirstInstance, Some(first)) => Some(first.value()?),
            _ => None,
        };

        let mut samples = Vec::with_capacity(family.instances().len());
        for instance in family.instances() {
            let labels = self.instance_labels(&family.name, &family.name, instance)?;
            let value = match shared_value {
                Some(value) => value,
                None => instance.value()?,
            };
            samples.push(Sample::new(labels, timestamp, value));
        }
        Ok(samples)
    }

    fn parse_summary(&self, family: &MetricFamily, timestamp: Timestamp) -> Result<Vec<Sample>> {
        let mut samples = vec![];
        for instance in family.instances() {
            let quantiles = match instance.quantiles()? {
                Some(quantiles) => quantiles,
                None => continue,
            };

            for (quantile, value) in quantiles {
                let labels = self.base_labels(&family.name).with(QUANTILE_LABEL, quantile);
                samples.push(Sample::new(labels, timestamp, value));
            }
            self.push_sum_and_count(&mut samples, family, instance, timestamp)?;
        }
        Ok(samples)
    }

    fn parse_histogram(&self, family: &MetricFamily, timestamp: Timestamp) -> Result<Vec<Sample>> {
        let bucket_name = format!("{}_bucket", family.name);

        let mut samples = vec![];
        for instance in family.instances() {
            let mut labels = self.instance_labels(&family.name, &bucket_name, instance)?;
            if labels.remove(BUCKET_LABEL).is_some() {
                warn!(
                    "family '{}': dropping label '{}' that clashes with the bucket bound",
                    family.name, BUCKET_LABEL
                );
            }
            for (le, count) in instance.buckets()? {
                samples.push(Sample::new(
                    labels.clone().with(BUCKET_LABEL, le),
                    timestamp,
                    count,
                ));
            }
            self.push_sum_and_count(&mut samples, family, instance, timestamp)?;
        }
        Ok(samples)
    }

    fn push_sum_and_count(
        &self,
        samples: &mut Vec<Sample>,
        family: &MetricFamily,
        instance: &MetricInstance,
        timestamp: Timestamp,
    ) -> Result<()> {
        samples.push(Sample::new(
            self.base_labels(&format!("{}_sum", family.name)),
            timestamp,
            instance.sum()?,
        ));
        samples.push(Sample::new(
            self.base_labels(&format!("{}_count", family.name)),
            timestamp,
            instance.count()?,
        ));
        Ok(())
    }

    fn base_labels(&self, name: &str) -> LabelSet {
        LabelSet::base(name, self.opts.instance.as_str(), self.opts.job.as_str())
    }

    fn instance_labels(
        &self,
        family_name: &str,
        name: &str,
        instance: &MetricInstance,
    ) -> Result<LabelSet> {
        let own = instance.labels()?;

        let mut labels = self.base_labels(name);
        let skipped = labels.merge(own.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        for label in skipped {
            warn!(
                "family '{}': dropping label '{}' that shadows a base label",
                family_name, label
            );
        }
        Ok(labels)
    }
}

/// One-shot form of [`FamilyParser::parse_line`].
pub fn parse(
    line: &[u8],
    timestamp: Timestamp,
    instance: &str,
    job: &str,
) -> Result<Vec<Sample>> {
    FamilyParser::new(ParseOptions::new(instance, job)).parse_line(line, timestamp)
}
