use log::{error, info, warn};

use super::formatter::Formatter;
use super::writer::Writer;
use crate::error::{Error, ErrorKind, Result};
use crate::model::Timestamp;
use crate::timeline::Batch;

/// Destination for finished batches.
pub trait SampleSink {
    fn name(&self) -> &str;

    fn send(&mut self, batch: &Batch) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Formats every sample of a batch and writes it as one record.
pub struct WriterSink {
    name: String,
    writer: Box<dyn Writer>,
    formatter: Box<dyn Formatter>,
}

impl WriterSink {
    pub fn new<N: Into<String>>(
        name: N,
        writer: Box<dyn Writer>,
        formatter: Box<dyn Formatter>,
    ) -> Self {
        Self {
            name: name.into(),
            writer,
            formatter,
        }
    }
}

impl SampleSink for WriterSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, batch: &Batch) -> Result<()> {
        for sample in batch.samples() {
            let buf = self.formatter.format(sample)?;
            self.writer.write(&buf).map_err(|e| {
                Error::from((format!("{}: writer failed", self.name), e)).with_kind(ErrorKind::Sink)
            })?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            Error::from((format!("{}: flush failed", self.name), e)).with_kind(ErrorKind::Sink)
        })
    }
}

/// Hands every batch to all of its sinks, in order. The first failing
/// sink fails the whole send.
pub struct FanoutSink {
    sinks: Vec<Box<dyn SampleSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn SampleSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SampleSink for FanoutSink {
    fn name(&self) -> &str {
        "fanout"
    }

    fn send(&mut self, batch: &Batch) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.send(batch)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}

/// State of one batch after a publishing pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Produced but never handed to the sink.
    Pending,
    Sent,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub line_no: usize,
    pub timestamp: Timestamp,
    pub samples: usize,
    pub delivery: Delivery,
}

impl DeliveryReport {
    fn pending(batch: &Batch) -> Self {
        Self {
            line_no: batch.line_no(),
            timestamp: batch.timestamp(),
            samples: batch.len(),
            delivery: Delivery::Pending,
        }
    }
}

/// Sends batches to a sink and records what happened to each of them.
/// There's no retrying here; callers can resend whatever wasn't `Sent`.
pub struct Publisher {
    fail_fast: bool,
}

impl Publisher {
    pub fn new(fail_fast: bool) -> Self {
        Self { fail_fast }
    }

    pub fn publish(&self, batches: &[Batch], sink: &mut dyn SampleSink) -> Vec<DeliveryReport> {
        let mut reports: Vec<DeliveryReport> = batches.iter().map(DeliveryReport::pending).collect();

        for (batch, report) in batches.iter().zip(reports.iter_mut()) {
            match sink.send(batch) {
                Ok(()) => report.delivery = Delivery::Sent,
                Err(e) => {
                    error!("{}: batch of line {} rejected: {}", sink.name(), batch.line_no(), e);
                    report.delivery = Delivery::Rejected(e.to_string());
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        if let Err(e) = sink.flush() {
            warn!("{}: {}", sink.name(), e);
            for report in reports.iter_mut() {
                if report.delivery == Delivery::Sent {
                    report.delivery = Delivery::Rejected(e.to_string());
                }
            }
        }

        let sent = reports.iter().filter(|r| r.delivery == Delivery::Sent).count();
        info!("{}: {}/{} batch(es) sent", sink.name(), sent, reports.len());
        reports
    }
}

/// Turns a publishing pass into an error if anything didn't make it.
pub fn check_delivered(reports: &[DeliveryReport]) -> Result<()> {
    let failed: Vec<&DeliveryReport> = reports
        .iter()
        .filter(|r| r.delivery != Delivery::Sent)
        .collect();

    match failed.first() {
        None => Ok(()),
        Some(first) => Err(Error::sink(format!(
            "{} batch(es) not delivered, first at line {}",
            failed.len(),
            first.line_no
        ))),
    }
}
