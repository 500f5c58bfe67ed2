use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::line::{DelimReader, Lines};
use crate::error::{Error, ErrorKind, Result};

/// A line-delimited JSON dump together with the `instance` label value
/// its samples are reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    instance: String,
    path: PathBuf,
}

impl Source {
    pub fn new<I, P>(instance: I, path: P) -> Self
    where
        I: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            instance: instance.into(),
            path: path.into(),
        }
    }

    #[inline]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<Lines> {
        let file = File::open(&self.path).map_err(|e| {
            Error::from((format!("couldn't open {}", self.path.display()), e))
                .with_kind(ErrorKind::Input)
        })?;
        Ok(Lines::new(Box::new(DelimReader::new(BufReader::new(file)))))
    }
}

impl std::str::FromStr for Source {
    type Err = Error;

    /// `INSTANCE=PATH`. Instances are often URLs, so the last `=` wins.
    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('=') {
            Some((instance, path)) if !instance.is_empty() && !path.is_empty() => {
                Ok(Source::new(instance, path))
            }
            _ => Err(Error::config(format!(
                "invalid source '{}', expected INSTANCE=PATH",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() -> Result<()> {
        #[rustfmt::skip]
        let tests = [
            ("demo.1=data/1.json", ("demo.1", "data/1.json")),
            ("http://demo.promlabs.com:10000/metrics=dump.ndjson", ("http://demo.promlabs.com:10000/metrics", "dump.ndjson")),
            ("http://host/metrics?a=b=dump.ndjson", ("http://host/metrics?a=b", "dump.ndjson")),
        ];

        for (input, (instance, path)) in &tests {
            let source: Source = input.parse()?;
            assert_eq!(source.instance(), *instance);
            assert_eq!(source.path(), Path::new(path));
        }

        for input in &["", "demo.1", "=x", "x="] {
            let err = input.parse::<Source>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        let source = Source::new("demo.1", "/definitely/not/here.ndjson");
        match source.open() {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Input),
            Ok(_) => panic!("expected an input error"),
        }
    }
}
