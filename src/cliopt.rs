use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crate::error::{Error, Result};
use crate::input::Source;
use crate::model::{self, parse_iso_time, Timestamp};
use crate::output::{Formatter, JsonFormatter, TextFormatter};
use crate::parse::{ParseOptions, ValueMode};
use crate::timeline::{PastNowPolicy, TimelineConfig};
use crate::utils::parse_duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::config(format!("unknown output format '{}'", s))),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "promfill",
    about = "Replays JSON metric-family dumps as backdated Prometheus samples"
)]
pub struct CliOpt {
    /// Input dump and the instance label it is reported under, as INSTANCE=PATH.
    /// Each line of the file is a JSON array of metric families.
    #[structopt(long = "source", short = "s", required = true, number_of_values = 1)]
    pub sources: Vec<Source>,

    /// Value of the `job` label.
    #[structopt(long, short, default_value = "job")]
    pub job: String,

    /// Reference time (RFC 3339), defaults to the current time.
    #[structopt(long, parse(try_from_str = parse_iso_time))]
    pub now: Option<Timestamp>,

    /// How far before `now` the first line is placed.
    #[structopt(long, short, default_value = "60m", parse(try_from_str = parse_duration))]
    pub anchor: Duration,

    /// Time between two consecutive lines.
    #[structopt(long, default_value = "5s", parse(try_from_str = parse_duration))]
    pub step: Duration,

    /// Give every gauge/counter instance its own value instead of the
    /// value of the family's first instance.
    #[structopt(long)]
    pub per_instance_values: bool,

    /// Keep lines whose timestamp reaches `now` instead of dropping them.
    #[structopt(long)]
    pub keep_past_now: bool,

    /// Sample format: text or json.
    #[structopt(long, short, default_value = "text", possible_values = &["text", "json"])]
    pub format: OutputFormat,

    /// Destination file. Repeat to write every batch to several files,
    /// defaults to stdout.
    #[structopt(long = "output", short = "o", number_of_values = 1)]
    pub outputs: Vec<PathBuf>,

    /// Keep sending after a batch is rejected.
    #[structopt(long)]
    pub keep_going: bool,

    /// Logging level.
    #[structopt(long, short, env = "LOG_LEVEL", default_value = "INFO")]
    pub loglevel: log::LevelFilter,
}

impl CliOpt {
    pub fn timeline_config(&self) -> TimelineConfig {
        let past_now = if self.keep_past_now {
            PastNowPolicy::Keep
        } else {
            PastNowPolicy::Skip
        };

        TimelineConfig::new(self.now.unwrap_or_else(model::now))
            .with_anchor(self.anchor)
            .with_step(self.step)
            .with_past_now(past_now)
    }

    pub fn parse_options(&self, source: &Source) -> ParseOptions {
        let value_mode = if self.per_instance_values {
            ValueMode::PerInstance
        } else {
            ValueMode::FirstInstance
        };

        ParseOptions::new(source.instance(), self.job.as_str()).with_value_mode(value_mode)
    }
}
