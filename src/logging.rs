use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::{Error, ErrorKind, Result};

const PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";

/// Everything goes to stderr, stdout is reserved for samples.
pub fn app_config(level: LevelFilter) -> Result<Config> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| Error::from(("invalid logging config", e)).with_kind(ErrorKind::Config))
}

pub fn init(level: LevelFilter) -> Result<()> {
    log4rs::init_config(app_config(level)?)
        .map(|_| ())
        .map_err(|e| Error::from(("couldn't install logger", e)).with_kind(ErrorKind::Config))
}
