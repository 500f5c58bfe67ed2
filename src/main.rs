use std::fs::File;
use std::io::{self, BufWriter};

use structopt::StructOpt;

use promfill::cliopt::CliOpt;
use promfill::error::{Error, ErrorKind};
use promfill::logging;
use promfill::output::{LineWriter, Writer};
use promfill::runner::Runner;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = CliOpt::from_args();

    logging::init(opt.loglevel)?;
    log::info!("starting with {} source(s)", opt.sources.len());

    let mut writers: Vec<(String, Box<dyn Writer>)> = vec![];
    if opt.outputs.is_empty() {
        writers.push((
            "stdout".to_owned(),
            Box::new(LineWriter::new(BufWriter::new(io::stdout()))),
        ));
    }
    for path in &opt.outputs {
        let file = File::create(path).map_err(|e| {
            Error::from((format!("couldn't create {}", path.display()), e))
                .with_kind(ErrorKind::Sink)
        })?;
        writers.push((
            path.display().to_string(),
            Box::new(LineWriter::new(BufWriter::new(file))),
        ));
    }

    let reports = Runner::new(&opt, writers).run()?;
    log::info!("done, {} batch(es) delivered", reports.len());

    Ok(())
}
