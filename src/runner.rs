use log::info;

use crate::cliopt::CliOpt;
use crate::error::Result;
use crate::input::Source;
use crate::output::{
    check_delivered, DeliveryReport, FanoutSink, Publisher, SampleSink, Writer, WriterSink,
};
use crate::timeline::{Batch, Timeline, TimelineConfig};

// Source (INSTANCE=PATH) -> Lines -> Timeline (+ FamilyParser) -> Vec<Batch>
//                                                                    |
//                             Publisher -> FanoutSink -> WriterSink(Formatter -> Writer)*
//
// Every source is read and expanded before the first batch is sent.

pub struct Runner {
    sources: Vec<Source>,
    timelines: Vec<Timeline>,
    publisher: Publisher,
    keep_going: bool,
    sink: Box<dyn SampleSink>,
}

impl Runner {
    /// `writers` are named destinations, each gets every batch.
    pub fn new(opt: &CliOpt, writers: Vec<(String, Box<dyn Writer>)>) -> Self {
        let config: TimelineConfig = opt.timeline_config();

        let timelines = opt
            .sources
            .iter()
            .map(|source| Timeline::new(config.clone(), opt.parse_options(source)))
            .collect();

        let sinks = writers
            .into_iter()
            .map(|(name, writer)| {
                Box::new(WriterSink::new(name, writer, opt.format.formatter()))
                    as Box<dyn SampleSink>
            })
            .collect();

        Self {
            sources: opt.sources.clone(),
            timelines,
            publisher: Publisher::new(!opt.keep_going),
            keep_going: opt.keep_going,
            sink: Box::new(FanoutSink::new(sinks)),
        }
    }

    pub fn run(&mut self) -> Result<Vec<DeliveryReport>> {
        let mut expanded: Vec<(&Source, Vec<Batch>)> = vec![];
        for (source, timeline) in self.sources.iter().zip(self.timelines.iter()) {
            expanded.push((source, timeline.synthesize_source(source)?));
        }

        let mut reports = vec![];
        for (source, batches) in expanded {
            info!("publishing {} batch(es) of {}", batches.len(), source.instance());
            let source_reports = self.publisher.publish(&batches, self.sink.as_mut());
            let delivered = check_delivered(&source_reports);
            reports.extend(source_reports);
            if !self.keep_going {
                delivered?;
            }
        }

        check_delivered(&reports)?;
        Ok(reports)
    }
}
