use std::convert::TryFrom;
use std::io;
use std::time::Duration;

use log::{debug, info};

use crate::error::{Error, ErrorKind, Result};
use crate::input::Source;
use crate::model::{self, Sample, Timestamp, TimestampTrait};
use crate::parse::{FamilyParser, ParseOptions};

pub const DEFAULT_ANCHOR: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_STEP: Duration = Duration::from_secs(5);

/// What to do with a line whose synthetic timestamp reaches `now`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PastNowPolicy {
    /// Drop the line, no batch is produced for it.
    Skip,
    /// Process the line anyway, with a timestamp at or after `now`.
    Keep,
}

impl Default for PastNowPolicy {
    fn default() -> Self {
        PastNowPolicy::Skip
    }
}

#[derive(Debug, Clone)]
pub struct TimelineConfig {
    pub now: Timestamp,
    pub anchor: Duration,
    pub step: Duration,
    pub past_now: PastNowPolicy,
}

impl TimelineConfig {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            anchor: DEFAULT_ANCHOR,
            step: DEFAULT_STEP,
            past_now: PastNowPolicy::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: Duration) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn with_past_now(mut self, past_now: PastNowPolicy) -> Self {
        self.past_now = past_now;
        self
    }

    /// `now - anchor`. The first line lands one step after it.
    pub fn start(&self) -> Timestamp {
        self.now.sub(self.anchor)
    }

    fn validate(&self) -> Result<()> {
        if self.step.as_millis() == 0 {
            return Err(Error::config("step must be at least 1ms"));
        }
        Ok(())
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::new(model::now())
    }
}

/// Samples decoded from one input line, all sharing one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    line_no: usize,
    timestamp: Timestamp,
    samples: Vec<Sample>,
}

impl Batch {
    pub fn new(line_no: usize, timestamp: Timestamp, samples: Vec<Sample>) -> Self {
        Self {
            line_no,
            timestamp,
            samples,
        }
    }

    #[inline]
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Replays a sequence of metric dumps as if they had been scraped every
/// `step`, starting `anchor` before `now`.
pub struct Timeline {
    config: TimelineConfig,
    parser: FamilyParser,
}

impl Timeline {
    pub fn new(config: TimelineConfig, opts: ParseOptions) -> Self {
        Self {
            config,
            parser: FamilyParser::new(opts),
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Timestamp of the n-th (1-based) input line.
    pub fn timestamp_of(&self, line_no: usize) -> Timestamp {
        let offset = u32::try_from(line_no)
            .ok()
            .and_then(|n| self.config.step.checked_mul(n))
            .unwrap_or(Duration::MAX);
        self.config.start().add(offset)
    }

    /// Reads every line up front and returns one batch per kept line.
    /// The first read or decode failure aborts the whole run.
    pub fn synthesize<I>(&self, lines: I) -> Result<Vec<Batch>>
    where
        I: IntoIterator<Item = io::Result<Vec<u8>>>,
    {
        self.config.validate()?;

        let mut batches = vec![];
        let mut skipped = 0;

        for (idx, line) in lines.into_iter().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| {
                Error::from((format!("couldn't read line {}", line_no), e))
                    .with_kind(ErrorKind::Input)
            })?;

            // The clock advances for every line, kept or not.
            let timestamp = self.timestamp_of(line_no);
            if timestamp >= self.config.now && self.config.past_now == PastNowPolicy::Skip {
                debug!(
                    "line {}: {} is not in the past, skipping",
                    line_no,
                    timestamp.to_string_millis()
                );
                skipped += 1;
                continue;
            }

            let samples = if line.iter().all(|b| b.is_ascii_whitespace()) {
                vec![]
            } else {
                self.parser
                    .parse_line(&line, timestamp)
                    .map_err(|e| Error::decode(format!("line {}: {}", line_no, e)))?
            };

            batches.push(Batch::new(line_no, timestamp, samples));
        }

        if skipped > 0 {
            info!("skipped {} line(s) with timestamps at or after now", skipped);
        }
        Ok(batches)
    }

    pub fn synthesize_source(&self, source: &Source) -> Result<Vec<Batch>> {
        info!(
            "reading {} for instance {}",
            source.path().display(),
            source.instance()
        );
        let batches = self.synthesize(source.open()?)?;
        info!(
            "instance {}: {} batch(es), {} sample(s)",
            source.instance(),
            batches.len(),
            batches.iter().map(|b| b.len()).sum::<usize>()
        );
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ValueMode;

    const NOW: Timestamp = 1609459200000;

    fn lines(input: &[&str]) -> Vec<io::Result<Vec<u8>>> {
        input.iter().map(|l| Ok(l.as_bytes().to_vec())).collect()
    }

    fn timeline(config: TimelineConfig) -> Timeline {
        Timeline::new(
            config,
            ParseOptions::new("demo.1", "job").with_value_mode(ValueMode::PerInstance),
        )
    }

    const GAUGE: &str = r#"[{"name":"x","type":"GAUGE","metrics":[{"value":"1"}]}]"#;

    #[test]
    fn test_timestamps_advance_by_step() -> Result<()> {
        let timeline = timeline(TimelineConfig::new(NOW));
        let batches = timeline.synthesize(lines(&[GAUGE, GAUGE, GAUGE]))?;

        let start = NOW - 60 * 60 * 1000;
        let timestamps: Vec<Timestamp> = batches.iter().map(|b| b.timestamp()).collect();
        assert_eq!(timestamps, vec![start + 5000, start + 10000, start + 15000]);

        for batch in &batches {
            for sample in batch.samples() {
                assert_eq!(sample.timestamp(), batch.timestamp());
            }
        }
        Ok(())
    }

    #[test]
    fn test_empty_lines_still_advance() -> Result<()> {
        let config = TimelineConfig::new(NOW).with_anchor(Duration::from_secs(30 * 60));
        let batches = timeline(config).synthesize(lines(&[
            GAUGE,
            "",
            r#"[{"name":"x","type":"UNKNOWN","metrics":[]}]"#,
            GAUGE,
        ]))?;

        let start = NOW - 30 * 60 * 1000;
        #[rustfmt::skip]
        let expected = [
            (1, start + 5000, 1),
            (2, start + 10000, 0),
            (3, start + 15000, 0),
            (4, start + 20000, 1),
        ];

        assert_eq!(batches.len(), expected.len());
        for (batch, (line_no, ts, len)) in batches.iter().zip(expected.iter()) {
            assert_eq!(batch.line_no(), *line_no);
            assert_eq!(batch.timestamp(), *ts);
            assert_eq!(batch.len(), *len);
        }
        Ok(())
    }

    #[test]
    fn test_past_now_policy() -> Result<()> {
        // Lines 1 and 2 land before now, line 3 exactly at now, line 4 after.
        let config = TimelineConfig::new(NOW)
            .with_anchor(Duration::from_secs(15))
            .with_step(Duration::from_secs(5));
        let input = [GAUGE, GAUGE, GAUGE, GAUGE];

        let batches = timeline(config.clone()).synthesize(lines(&input))?;
        let kept: Vec<usize> = batches.iter().map(|b| b.line_no()).collect();
        assert_eq!(kept, vec![1, 2]);

        let batches = timeline(config.with_past_now(PastNowPolicy::Keep)).synthesize(lines(&input))?;
        let timestamps: Vec<Timestamp> = batches.iter().map(|b| b.timestamp()).collect();
        assert_eq!(timestamps, vec![NOW - 10000, NOW - 5000, NOW, NOW + 5000]);
        Ok(())
    }

    #[test]
    fn test_decode_failure_aborts() {
        let err = timeline(TimelineConfig::new(NOW))
            .synthesize(lines(&[GAUGE, "[{oops"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.message().starts_with("line 2:"), "{}", err);
    }

    #[test]
    fn test_read_failure_aborts() {
        let input = vec![
            Ok(GAUGE.as_bytes().to_vec()),
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire")),
        ];
        let err = timeline(TimelineConfig::new(NOW)).synthesize(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = TimelineConfig::new(NOW).with_step(Duration::from_millis(0));
        let err = timeline(config).synthesize(lines(&[GAUGE])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
